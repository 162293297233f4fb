#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

//! Browser round trip: mount over a real section, drive input through the
//! host-driven entry points, and unmount.
//!
//! Run:
//!   wasm-pack test --headless --firefox crates/heroscroll-web

use heroscroll_web::ScrollExpandMedia;
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

const CONFIG: &str = r#"{
    "mediaKind": "image",
    "mediaSource": "https://cdn.example/still.jpg",
    "title": "Dynamic Image",
    "captionLine1": "Scroll",
    "onCompleteBehavior": "hold",
    "tuning": { "wheelScale": 0.001 }
}"#;

fn section_with_child() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let section = document
        .create_element("section")
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    let child = document.create_element("p").unwrap();
    child.set_text_content(Some("page content"));
    section.append_child(&child).unwrap();
    document.body().unwrap().append_child(&section).unwrap();
    section
}

fn field(obj: &JsValue, key: &str) -> JsValue {
    Reflect::get(obj, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn invalid_config_is_reported() {
    let section = section_with_child();
    assert!(ScrollExpandMedia::new(section, r#"{"mediaSource":""}"#).is_err());
}

#[wasm_bindgen_test]
fn mount_wraps_and_unmount_restores_children() {
    let section = section_with_child();
    let hero = ScrollExpandMedia::new(section.clone(), CONFIG).unwrap();
    hero.mount().unwrap();
    assert!(hero.is_mounted());
    assert!(section.query_selector(".hero-scroll__content p").unwrap().is_some());
    assert!(section.query_selector("img").unwrap().is_some());

    hero.unmount().unwrap();
    assert!(!hero.is_mounted());
    assert!(section.query_selector(".hero-scroll").unwrap().is_none());
    assert_eq!(section.child_element_count(), 1);
    section.remove();
}

#[wasm_bindgen_test]
fn host_driven_input_completes_and_holds() {
    let section = section_with_child();
    let hero = ScrollExpandMedia::new(section.clone(), CONFIG).unwrap();
    hero.mount().unwrap();

    assert_eq!(hero.input(r#"{"kind":"wheel","dy":1200}"#).unwrap(), "consume");
    let state = hero.state().unwrap();
    assert_eq!(field(&state, "progress").as_f64(), Some(1.0));
    assert_eq!(field(&state, "complete").as_bool(), Some(true));

    // Hold keeps consuming forward input at completion.
    assert_eq!(hero.input(r#"{"kind":"wheel","dy":50}"#).unwrap(), "consume");
    hero.destroy().unwrap();
    section.remove();
}

#[wasm_bindgen_test]
fn media_change_resets_and_swaps_element() {
    let section = section_with_child();
    let hero = ScrollExpandMedia::new(section.clone(), CONFIG).unwrap();
    hero.mount().unwrap();
    hero.input(r#"{"kind":"wheel","dy":300}"#).unwrap();

    assert!(!hero.set_media("image", "https://cdn.example/still.jpg").unwrap());
    assert!(hero.set_media("video", "https://cdn.example/loop.mp4").unwrap());
    assert!(section.query_selector("video").unwrap().is_some());
    assert!(section.query_selector("img").unwrap().is_none());
    assert_eq!(field(&hero.state().unwrap(), "progress").as_f64(), Some(0.0));
    assert!(hero.is_mounted());

    assert!(hero.set_media("audio", "x.mp3").is_err());
    hero.destroy().unwrap();
    section.remove();
}

#[wasm_bindgen_test]
fn frame_input_reports_each_unit() {
    let section = section_with_child();
    let hero = ScrollExpandMedia::new(section.clone(), CONFIG).unwrap();
    let out = hero
        .input_frame(r#"[{"kind":"wheel","dy":100},{"kind":"wheel","dy":100},{"kind":"resize","width":390,"height":844}]"#)
        .unwrap();
    assert_eq!(out, vec!["consume".to_owned(), "pass_through".to_owned()]);
    let stats = hero.stats().unwrap();
    assert_eq!(field(&stats, "batches").as_f64(), Some(1.0));
    hero.destroy().unwrap();
    section.remove();
}
