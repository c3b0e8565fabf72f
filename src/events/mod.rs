pub mod keyboard;
pub mod pointer;

use crate::audio::{SharedSession, WebGraph};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use twinwheels_core::{Channel, GestureState};
use web_sys as web;

/// Handles shared by every listener on one wheel.
#[derive(Clone)]
pub struct WheelWiring {
    pub session: SharedSession,
    pub graph: WebGraph,
    pub channel: Channel,
    pub root: web::HtmlElement,
    pub gesture: Rc<RefCell<GestureState>>,
    /// Wheel the keyboard acts on; the last one touched.
    pub focus: Rc<Cell<Channel>>,
}
