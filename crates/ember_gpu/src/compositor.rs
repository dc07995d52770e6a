//! Layer stack and lifecycle broadcast.
//!
//! The compositor owns an ordered stack of render layers and relays three
//! events to every layer: surface creation, surface size changes, and the
//! per-frame draw. Draw order is registration order, so earlier layers
//! paint behind later ones.
//!
//! The compositor is generic over the per-frame context `F`; the renderer
//! instantiates it with [`crate::frame::FrameContext`], while tests can use
//! `()` and run the full lifecycle without a GPU.

use tracing::{debug, warn};

/// A drawable member of the compositor stack.
///
/// GPU handles are captured when the layer is constructed; the surface
/// callbacks only create and resize resources that depend on the surface
/// being alive.
pub trait RenderLayer<F> {
    /// The surface exists; allocate pipelines and buffers.
    fn on_surface_created(&mut self);

    /// The surface was (re)sized. Either dimension may be zero while a
    /// window is minimized; layers must tolerate that and draw nothing.
    fn on_surface_changed(&mut self, width: u32, height: u32);

    /// Record this layer's draw into the frame.
    fn on_draw_frame(&mut self, frame: &mut F);
}

/// Where the surface is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfacePhase {
    /// No surface yet; draw requests are dropped.
    Dormant,
    /// Surface created, size not yet reported.
    Created,
    /// Surface created with a known size.
    Sized { width: u32, height: u32 },
}

/// Ordered layer stack with lifecycle tracking.
pub struct FrameCompositor<F> {
    layers: Vec<Box<dyn RenderLayer<F>>>,
    phase: SurfacePhase,
}

impl<F> FrameCompositor<F> {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            phase: SurfacePhase::Dormant,
        }
    }

    /// Appends a layer to the top of the stack.
    ///
    /// A layer registered after the surface came up is caught up
    /// immediately: it receives the created callback, and the last known
    /// size if one was reported.
    pub fn add_layer(&mut self, mut layer: Box<dyn RenderLayer<F>>) {
        match self.phase {
            SurfacePhase::Dormant => {}
            SurfacePhase::Created => layer.on_surface_created(),
            SurfacePhase::Sized { width, height } => {
                layer.on_surface_created();
                layer.on_surface_changed(width, height);
            }
        }
        self.layers.push(layer);
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    /// Broadcasts surface creation in registration order. Called again
    /// after a surface is lost and rebuilt.
    pub fn surface_created(&mut self) {
        debug!(layers = self.layers.len(), "surface created");
        self.phase = SurfacePhase::Created;
        for layer in &mut self.layers {
            layer.on_surface_created();
        }
    }

    /// Broadcasts a size change in registration order.
    pub fn surface_changed(&mut self, width: u32, height: u32) {
        if self.phase == SurfacePhase::Dormant {
            warn!(width, height, "ignoring resize before surface creation");
            return;
        }
        self.phase = SurfacePhase::Sized { width, height };
        for layer in &mut self.layers {
            layer.on_surface_changed(width, height);
        }
    }

    /// Broadcasts one frame in registration order. A draw before the
    /// surface exists is a no-op.
    pub fn draw_frame(&mut self, frame: &mut F) {
        if self.phase == SurfacePhase::Dormant {
            return;
        }
        for layer in &mut self.layers {
            layer.on_draw_frame(frame);
        }
    }
}

impl<F> Default for FrameCompositor<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Probe {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Probe {
        fn boxed(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Box<Self> {
            Box::new(Self {
                name,
                log: Rc::clone(log),
            })
        }
    }

    impl RenderLayer<()> for Probe {
        fn on_surface_created(&mut self) {
            self.log.borrow_mut().push(format!("{} created", self.name));
        }

        fn on_surface_changed(&mut self, width: u32, height: u32) {
            self.log
                .borrow_mut()
                .push(format!("{} sized {}x{}", self.name, width, height));
        }

        fn on_draw_frame(&mut self, _frame: &mut ()) {
            self.log.borrow_mut().push(format!("{} drew", self.name));
        }
    }

    #[test]
    fn broadcasts_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut compositor = FrameCompositor::new();
        compositor.add_layer(Probe::boxed("back", &log));
        compositor.add_layer(Probe::boxed("front", &log));

        compositor.surface_created();
        compositor.surface_changed(640, 480);
        compositor.draw_frame(&mut ());

        assert_eq!(
            *log.borrow(),
            vec![
                "back created",
                "front created",
                "back sized 640x480",
                "front sized 640x480",
                "back drew",
                "front drew",
            ]
        );
    }

    #[test]
    fn draw_before_creation_is_dropped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut compositor = FrameCompositor::new();
        compositor.add_layer(Probe::boxed("only", &log));

        compositor.draw_frame(&mut ());
        assert!(log.borrow().is_empty());
        assert_eq!(compositor.phase(), SurfacePhase::Dormant);
    }

    #[test]
    fn resize_before_creation_is_ignored() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut compositor = FrameCompositor::new();
        compositor.add_layer(Probe::boxed("only", &log));

        compositor.surface_changed(100, 100);
        assert!(log.borrow().is_empty());
        assert_eq!(compositor.phase(), SurfacePhase::Dormant);
    }

    #[test]
    fn late_layers_are_caught_up() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut compositor = FrameCompositor::new();
        compositor.surface_created();
        compositor.surface_changed(320, 200);

        compositor.add_layer(Probe::boxed("late", &log));
        assert_eq!(compositor.layer_count(), 1);
        assert_eq!(*log.borrow(), vec!["late created", "late sized 320x200"]);

        compositor.draw_frame(&mut ());
        assert_eq!(log.borrow().last().unwrap(), "late drew");
    }

    #[test]
    fn recreated_surface_broadcasts_again() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut compositor = FrameCompositor::new();
        compositor.add_layer(Probe::boxed("only", &log));

        compositor.surface_created();
        compositor.surface_changed(64, 64);
        compositor.surface_created();
        assert_eq!(compositor.phase(), SurfacePhase::Created);
        assert_eq!(
            *log.borrow(),
            vec!["only created", "only sized 64x64", "only created"]
        );
    }

    #[test]
    fn zero_sized_surface_still_broadcasts() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut compositor = FrameCompositor::new();
        compositor.add_layer(Probe::boxed("only", &log));

        compositor.surface_created();
        compositor.surface_changed(0, 0);
        compositor.draw_frame(&mut ());

        assert_eq!(
            compositor.phase(),
            SurfacePhase::Sized {
                width: 0,
                height: 0
            }
        );
        assert_eq!(log.borrow().last().unwrap(), "only drew");
    }
}
