#![forbid(unsafe_code)]

//! DOM shell for one hero.
//!
//! `build` wraps the host section: its existing children move into the
//! content block revealed after expansion, and the media box, overlay and
//! split headline are inserted above them. `teardown` puts the original
//! children back.

use heroscroll_core::{ExpandConfig, MediaElement, MediaKind, TitleSplit};
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Node};

use crate::style::{Declaration, FrameStyles};

type JsResult<T> = Result<T, JsValue>;

pub(crate) struct Shell {
    section: HtmlElement,
    root: HtmlElement,
    background: HtmlElement,
    media_box: HtmlElement,
    media_slot: Element,
    overlay: HtmlElement,
    text_layer: HtmlElement,
    title_lead: HtmlElement,
    title_rest: HtmlElement,
    caption_lead: HtmlElement,
    caption_rest: HtmlElement,
    content: HtmlElement,
}

impl Shell {
    pub(crate) fn build(
        document: &Document,
        section: &HtmlElement,
        config: &ExpandConfig,
        media: &MediaElement,
        kind: MediaKind,
    ) -> JsResult<Self> {
        let root = div(document, "hero-scroll")?;
        let background = div(document, "hero-scroll__background")?;
        let stage = div(document, "hero-scroll__stage")?;
        let media_box = div(document, "hero-scroll__media")?;
        let overlay = div(document, "hero-scroll__overlay")?;
        let text_layer = div(document, "hero-scroll__text")?;
        let title_lead = span(document, "hero-scroll__title-lead")?;
        let title_rest = span(document, "hero-scroll__title-rest")?;
        let caption_lead = span(document, "hero-scroll__caption-lead")?;
        let caption_rest = span(document, "hero-scroll__caption-rest")?;
        let content = div(document, "hero-scroll__content")?;

        while let Some(child) = section.first_child() {
            content.append_child(&child)?;
        }

        apply_static(
            &root,
            &[
                ("position", "relative"),
                ("min-height", "100dvh"),
                ("overflow-x", "hidden"),
            ],
        )?;
        apply_static(
            &background,
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("z-index", "0"),
                ("background-size", "cover"),
                ("background-position", "center"),
                ("pointer-events", "none"),
            ],
        )?;
        if !config.background_image_source.is_empty() {
            background
                .style()
                .set_property("background-image", &css_url(&config.background_image_source))?;
        }
        apply_static(
            &stage,
            &[("position", "relative"), ("height", "100dvh"), ("z-index", "1")],
        )?;
        apply_static(
            &media_box,
            &[
                ("position", "absolute"),
                ("top", "50%"),
                ("left", "50%"),
                ("transform", "translate(-50%, -50%)"),
                ("overflow", "hidden"),
                ("z-index", "1"),
            ],
        )?;
        apply_static(
            &overlay,
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("pointer-events", "none"),
                ("background", overlay_tint(kind)),
            ],
        )?;
        apply_static(
            &text_layer,
            &[
                ("position", "absolute"),
                ("inset", "0"),
                ("z-index", "2"),
                ("display", "flex"),
                ("flex-direction", "column"),
                ("align-items", "center"),
                ("justify-content", "center"),
                ("pointer-events", "none"),
            ],
        )?;
        if config.blend_title_with_background {
            text_layer.style().set_property("mix-blend-mode", "difference")?;
        }
        apply_static(&content, &[("position", "relative"), ("z-index", "3")])?;
        // Transforms are ignored on inline boxes.
        for part in [&title_lead, &title_rest, &caption_lead, &caption_rest] {
            apply_static(part, &[("display", "inline-block"), ("white-space", "pre")])?;
        }

        let title = TitleSplit::from_title(config.title.as_deref());
        title_lead.set_text_content(Some(&title.lead));
        title_rest.set_text_content(Some(&title.rest));
        set_caption(&caption_lead, config.caption_line1.as_deref())?;
        set_caption(&caption_rest, config.caption_line2.as_deref())?;

        let headline = document.create_element("h2")?;
        headline.set_class_name("hero-scroll__title");
        headline.append_child(&title_lead)?;
        headline.append_child(&title_rest)?;
        let captions = div(document, "hero-scroll__captions")?;
        captions.append_child(&caption_lead)?;
        captions.append_child(&caption_rest)?;
        text_layer.append_child(&headline)?;
        text_layer.append_child(&captions)?;

        let media_slot = create_media(document, media)?;
        media_box.append_child(&media_slot)?;
        media_box.append_child(&overlay)?;

        stage.append_child(&media_box)?;
        stage.append_child(&text_layer)?;
        root.append_child(&background)?;
        root.append_child(&stage)?;
        root.append_child(&content)?;
        section.append_child(&root)?;

        Ok(Self {
            section: section.clone(),
            root,
            background,
            media_box,
            media_slot,
            overlay,
            text_layer,
            title_lead,
            title_rest,
            caption_lead,
            caption_rest,
            content,
        })
    }

    /// Write one frame's inline styles.
    pub(crate) fn apply(&self, styles: &FrameStyles) -> JsResult<()> {
        set_all(&self.root, &styles.root)?;
        set_all(&self.background, &styles.background)?;
        set_all(&self.media_box, &styles.media_box)?;
        set_all(&self.overlay, &styles.overlay)?;
        set_all(&self.text_layer, &styles.text_layer)?;
        set_all(&self.title_lead, &styles.title_lead)?;
        set_all(&self.title_rest, &styles.title_rest)?;
        set_all(&self.caption_lead, &styles.caption_lead)?;
        set_all(&self.caption_rest, &styles.caption_rest)?;
        set_all(&self.content, &styles.content)
    }

    /// Swap the media element in place and retint the overlay.
    pub(crate) fn replace_media(
        &mut self,
        document: &Document,
        media: &MediaElement,
        kind: MediaKind,
    ) -> JsResult<()> {
        let next = create_media(document, media)?;
        self.media_box.replace_child(&next, &self.media_slot)?;
        self.media_slot = next;
        self.overlay.style().set_property("background", overlay_tint(kind))
    }

    /// Return the section to its original children.
    pub(crate) fn teardown(self) -> JsResult<()> {
        let anchor: &Node = &self.root;
        while let Some(child) = self.content.first_child() {
            self.section.insert_before(&child, Some(anchor))?;
        }
        self.root.remove();
        Ok(())
    }
}

fn create_media(document: &Document, media: &MediaElement) -> JsResult<Element> {
    let element = match media {
        MediaElement::Video { src, poster } => {
            let video = document.create_element("video")?;
            video.set_attribute("src", src)?;
            if let Some(poster) = poster {
                video.set_attribute("poster", poster)?;
            }
            for flag in ["autoplay", "muted", "loop", "playsinline"] {
                video.set_attribute(flag, "")?;
            }
            video.set_attribute("preload", "auto")?;
            // The attribute alone does not mute a script-created element.
            Reflect::set(&video, &"muted".into(), &JsValue::TRUE)?;
            video
        }
        MediaElement::Embed { url } => {
            let frame = document.create_element("iframe")?;
            frame.set_attribute("src", url)?;
            frame.set_attribute("allow", "autoplay; encrypted-media")?;
            frame.set_attribute("tabindex", "-1")?;
            frame.set_attribute(
                "style",
                "position:absolute;top:-100%;left:-100%;width:300%;height:300%;border:0;pointer-events:none",
            )?;
            frame
        }
        MediaElement::Image { src, alt } => {
            let img = document.create_element("img")?;
            img.set_attribute("src", src)?;
            img.set_attribute("alt", alt)?;
            img
        }
    };
    if !matches!(media, MediaElement::Embed { .. }) {
        element.set_attribute("style", "width:100%;height:100%;object-fit:cover")?;
    }
    element.set_class_name("hero-scroll__media-element");
    Ok(element)
}

fn overlay_tint(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "rgba(0, 0, 0, 0.3)",
        MediaKind::Image => "rgba(0, 0, 0, 0.5)",
    }
}

fn set_caption(el: &HtmlElement, text: Option<&str>) -> JsResult<()> {
    match text.filter(|t| !t.is_empty()) {
        Some(text) => {
            el.set_text_content(Some(text));
            el.style().set_property("display", "inline-block")?;
        }
        None => {
            el.set_text_content(None);
            el.style().set_property("display", "none")?;
        }
    }
    Ok(())
}

fn css_url(src: &str) -> String {
    format!("url(\"{}\")", src.replace('"', "%22"))
}

fn div(document: &Document, class: &str) -> JsResult<HtmlElement> {
    html(document, "div", class)
}

fn span(document: &Document, class: &str) -> JsResult<HtmlElement> {
    html(document, "span", class)
}

fn html(document: &Document, tag: &str, class: &str) -> JsResult<HtmlElement> {
    let el = document.create_element(tag)?.dyn_into::<HtmlElement>()?;
    el.set_class_name(class);
    Ok(el)
}

fn apply_static(el: &HtmlElement, props: &[(&str, &str)]) -> JsResult<()> {
    let style = el.style();
    for (property, value) in props {
        style.set_property(property, value)?;
    }
    Ok(())
}

fn set_all(el: &HtmlElement, decls: &[Declaration]) -> JsResult<()> {
    let style = el.style();
    for d in decls {
        style.set_property(d.property, &d.value)?;
    }
    Ok(())
}
