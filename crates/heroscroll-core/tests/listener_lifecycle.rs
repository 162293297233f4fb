#![forbid(unsafe_code)]

//! Listener lifecycle as a host drives it: mount, media change, unmount.
//!
//! Run:
//!   cargo test -p heroscroll-core --test listener_lifecycle

use std::cell::RefCell;
use std::rc::Rc;

use heroscroll_core::{
    ExpandConfig, ExpandController, InputBindings, InputEvent, ListenerScope, MediaIdentity,
    MediaKind, MediaUpdate, Placement, WheelEvent,
};

#[derive(Debug, Default)]
struct Registry {
    live: usize,
    attaches: usize,
    detaches: usize,
}

struct Bindings {
    registry: Rc<RefCell<Registry>>,
}

impl InputBindings for Bindings {
    type Error = std::convert::Infallible;

    fn attach(&mut self) -> Result<(), Self::Error> {
        let mut r = self.registry.borrow_mut();
        r.live += 1;
        r.attaches += 1;
        Ok(())
    }

    fn detach(&mut self) {
        let mut r = self.registry.borrow_mut();
        r.live -= 1;
        r.detaches += 1;
    }
}

/// Minimal host: one controller plus its listener scope.
struct Host {
    controller: ExpandController,
    listeners: ListenerScope<Bindings>,
}

impl Host {
    fn mount(registry: &Rc<RefCell<Registry>>, source: &str) -> Self {
        let config = ExpandConfig::new(MediaKind::Video, source);
        let mut controller = ExpandController::new(config).unwrap();
        controller.resize(1280.0, 800.0);
        let listeners = ListenerScope::new(Bindings {
            registry: Rc::clone(registry),
        })
        .unwrap();
        Self {
            controller,
            listeners,
        }
    }

    fn set_media(&mut self, media: MediaIdentity) -> MediaUpdate {
        let update = self.controller.set_media(media);
        if update.is_reset() {
            self.listeners.cycle().unwrap();
        }
        update
    }

    fn unmount(mut self) {
        let _ = self.controller.unmount();
        self.listeners.detach();
    }
}

fn wheel(dy: f64) -> InputEvent {
    InputEvent::Wheel(WheelEvent::new(dy))
}

#[test]
fn mount_attaches_once() {
    let registry = Rc::new(RefCell::new(Registry::default()));
    let host = Host::mount(&registry, "a.mp4");
    assert_eq!(registry.borrow().live, 1);
    assert!(host.listeners.is_attached());
    drop(host);
    assert_eq!(registry.borrow().live, 0);
}

#[test]
fn media_change_cycles_listeners_exactly_once() {
    let registry = Rc::new(RefCell::new(Registry::default()));
    let mut host = Host::mount(&registry, "a.mp4");
    host.controller.handle(&wheel(500.0), Placement::UNKNOWN);

    let update = host.set_media(MediaIdentity::new(MediaKind::Video, "b.mp4"));
    assert!(update.is_reset());
    {
        let r = registry.borrow();
        assert_eq!((r.attaches, r.detaches, r.live), (2, 1, 1));
    }
    assert_eq!(host.controller.progress(), 0.0);

    // Same identity again: no cycle.
    let update = host.set_media(MediaIdentity::new(MediaKind::Video, "b.mp4"));
    assert_eq!(update, MediaUpdate::Unchanged);
    assert_eq!(registry.borrow().attaches, 2);
}

#[test]
fn unmount_detaches_exactly_once() {
    let registry = Rc::new(RefCell::new(Registry::default()));
    let mut host = Host::mount(&registry, "a.mp4");
    host.controller.handle(&wheel(200.0), Placement::UNKNOWN);
    host.unmount();
    let r = registry.borrow();
    assert_eq!(r.live, 0);
    assert_eq!(r.detaches, 1);
}

#[test]
fn independent_heroes_do_not_share_listeners() {
    let registry_a = Rc::new(RefCell::new(Registry::default()));
    let registry_b = Rc::new(RefCell::new(Registry::default()));
    let mut a = Host::mount(&registry_a, "a.mp4");
    let b = Host::mount(&registry_b, "b.mp4");

    a.set_media(MediaIdentity::new(MediaKind::Image, "a.jpg"));
    a.controller.handle(&wheel(5000.0), Placement::UNKNOWN);
    assert!(a.controller.is_complete());
    assert_eq!(b.controller.progress(), 0.0);
    assert_eq!(registry_b.borrow().attaches, 1);

    b.unmount();
    assert_eq!(registry_a.borrow().live, 1);
    assert_eq!(registry_b.borrow().live, 0);
}
