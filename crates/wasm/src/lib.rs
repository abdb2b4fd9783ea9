//! Browser host for the wave background.
//!
//! Wraps an `HtmlCanvasElement` as a [`Surface`], drives the
//! [`AnimationLoop`] from `requestAnimationFrame` and wires mouse, touch and
//! window-resize listeners while the loop runs.

use driftlines_core::{
    AnimationLoop, DVec2, FrameScheduler, FrameToken, StrokeStyle, Surface, WaveConfig,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent,
    Window,
};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
type Shared = Rc<RefCell<AnimationLoop<CanvasSurface, RafScheduler>>>;

/// Backing-store size for a CSS box, in whole pixels. Negative or NaN
/// extents give zero.
fn backing_size(css_width: f64, css_height: f64) -> (u32, u32) {
    let px = |v: f64| {
        if v.is_finite() && v > 0.0 {
            v.round().min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    };
    (px(css_width), px(css_height))
}

/// A canvas and its 2-D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Acquires the 2-D context. `None` when the canvas refuses one.
    fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let surface = Self { canvas, ctx };
        surface.fit_to_layout();
        Some(surface)
    }

    /// Matches the backing store to the element's laid-out size and returns
    /// the new size.
    fn fit_to_layout(&self) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        let (w, h) = backing_size(rect.width(), rect.height());
        if self.canvas.width() != w {
            self.canvas.set_width(w);
        }
        if self.canvas.height() != h {
            self.canvas.set_height(h);
        }
        (f64::from(w), f64::from(h))
    }

    /// Top-left of the canvas in client coordinates.
    fn origin(&self) -> DVec2 {
        let rect = self.canvas.get_bounding_client_rect();
        DVec2::new(rect.left(), rect.top())
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn stroke(&mut self, style: &StrokeStyle) {
        self.ctx.set_stroke_style_str(&style.css());
        self.ctx.set_line_width(style.width);
        self.ctx.stroke();
    }
}

/// `requestAnimationFrame` as a [`FrameScheduler`].
pub struct RafScheduler {
    window: Window,
    callback: FrameCallback,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> FrameToken {
        let id = self
            .callback
            .borrow()
            .as_ref()
            .and_then(|cb| {
                self.window
                    .request_animation_frame(cb.as_ref().unchecked_ref())
                    .ok()
            })
            .unwrap_or(0);
        // rAF ids are positive; 0 never matches a live request.
        FrameToken(u64::try_from(id).unwrap_or(0))
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if let Ok(id) = i32::try_from(token.0) {
            if id > 0 {
                let _ = self.window.cancel_animation_frame(id);
            }
        }
    }
}

/// Input listeners attached while the loop runs.
struct Listeners {
    mouse: Closure<dyn FnMut(MouseEvent)>,
    touch: Closure<dyn FnMut(TouchEvent)>,
    resize: Closure<dyn FnMut()>,
}

impl Listeners {
    fn attach(window: &Window, shared: &Shared) -> Result<Self, JsValue> {
        let weak = Rc::downgrade(shared);
        let mouse = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            pointer(&weak, f64::from(event.client_x()), f64::from(event.client_y()));
        });

        let weak = Rc::downgrade(shared);
        let touch = Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
            if let Some(t) = event.touches().get(0) {
                pointer(&weak, f64::from(t.client_x()), f64::from(t.client_y()));
            }
        });

        let weak = Rc::downgrade(shared);
        let resize = Closure::<dyn FnMut()>::new(move || {
            if let Some(shared) = weak.upgrade() {
                if let Ok(mut anim) = shared.try_borrow_mut() {
                    refit(&mut anim);
                }
            }
        });

        let listeners = Self {
            mouse,
            touch,
            resize,
        };
        if let Err(e) = listeners.add_to(window) {
            listeners.detach(window);
            return Err(e);
        }
        Ok(listeners)
    }

    fn add_to(&self, window: &Window) -> Result<(), JsValue> {
        let passive = AddEventListenerOptions::new();
        passive.set_passive(true);
        window
            .add_event_listener_with_callback("mousemove", self.mouse.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback_and_add_event_listener_options(
            "touchmove",
            self.touch.as_ref().unchecked_ref(),
            &passive,
        )?;
        window
            .add_event_listener_with_callback("resize", self.resize.as_ref().unchecked_ref())?;
        Ok(())
    }

    fn detach(&self, window: &Window) {
        let _ = window
            .remove_event_listener_with_callback("mousemove", self.mouse.as_ref().unchecked_ref());
        let _ = window
            .remove_event_listener_with_callback("touchmove", self.touch.as_ref().unchecked_ref());
        let _ = window
            .remove_event_listener_with_callback("resize", self.resize.as_ref().unchecked_ref());
    }
}

fn pointer(weak: &Weak<RefCell<AnimationLoop<CanvasSurface, RafScheduler>>>, x: f64, y: f64) {
    let Some(shared) = weak.upgrade() else { return };
    let Ok(mut anim) = shared.try_borrow_mut() else { return };
    let origin = anim.surface().map(CanvasSurface::origin).unwrap_or(DVec2::ZERO);
    anim.on_pointer(DVec2::new(x, y), origin);
}

fn refit(anim: &mut AnimationLoop<CanvasSurface, RafScheduler>) {
    if let Some((w, h)) = anim.surface().map(CanvasSurface::fit_to_layout) {
        anim.on_resize(w, h);
    }
}

/// The flowing-lines background bound to one canvas.
#[wasm_bindgen]
pub struct WaveBackground {
    window: Option<Window>,
    shared: Shared,
    listeners: Option<Listeners>,
    // rAF callback; dropped with the background.
    _frame: FrameCallback,
}

#[wasm_bindgen]
impl WaveBackground {
    /// Binds to `canvas`. `params_json` is a JSON object of wave parameters;
    /// unknown keys are ignored and malformed values fall back to defaults.
    /// Without a window or a 2-D context the background stays disabled.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, params_json: &str) -> WaveBackground {
        let params = serde_json::from_str(params_json).unwrap_or(serde_json::Value::Null);
        let config = WaveConfig::from_json(&params);
        let seed = js_sys::Math::random();

        let window = web_sys::window();
        let frame: FrameCallback = Rc::default();
        let (surface, scheduler_window) = match &window {
            Some(w) => (CanvasSurface::new(canvas), w.clone()),
            // A scheduler still needs a window handle; a disabled loop never calls it.
            None => (None, JsValue::UNDEFINED.unchecked_into()),
        };
        let scheduler = RafScheduler {
            window: scheduler_window,
            callback: Rc::clone(&frame),
        };
        let shared: Shared = Rc::new(RefCell::new(AnimationLoop::new(
            surface, scheduler, config, seed,
        )));

        let weak = Rc::downgrade(&shared);
        *frame.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            if let Some(shared) = weak.upgrade() {
                if let Ok(mut anim) = shared.try_borrow_mut() {
                    anim.on_frame(timestamp);
                }
            }
        }));

        WaveBackground {
            window,
            shared,
            listeners: None,
            _frame: frame,
        }
    }

    /// Starts animating and attaches input listeners. No-op when already
    /// running or disabled.
    pub fn start(&mut self) -> Result<(), JsValue> {
        {
            let mut anim = self.shared.borrow_mut();
            if anim.is_disabled() || anim.is_running() {
                return Ok(());
            }
            anim.start();
        }
        if let Some(window) = &self.window {
            match Listeners::attach(window, &self.shared) {
                Ok(listeners) => self.listeners = Some(listeners),
                Err(e) => {
                    self.shared.borrow_mut().stop();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Stops animating and detaches listeners. Idempotent.
    pub fn stop(&mut self) {
        if let Ok(mut anim) = self.shared.try_borrow_mut() {
            anim.stop();
        }
        if let (Some(window), Some(listeners)) = (&self.window, self.listeners.take()) {
            listeners.detach(window);
        }
    }

    /// Re-reads the canvas layout size and rebuilds the lattice. Ignored
    /// unless running.
    pub fn resize(&mut self) {
        if let Ok(mut anim) = self.shared.try_borrow_mut() {
            refit(&mut anim);
        }
    }

    /// Whether frames are being scheduled.
    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.shared.borrow().is_running()
    }
}

impl Drop for WaveBackground {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_size_rounds_css_pixels() {
        assert_eq!(backing_size(320.4, 199.6), (320, 200));
    }

    #[test]
    fn backing_size_rejects_degenerate_boxes() {
        assert_eq!(backing_size(-5.0, 10.0), (0, 10));
        assert_eq!(backing_size(f64::NAN, f64::INFINITY), (0, 0));
    }
}
