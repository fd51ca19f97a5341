//! Session controller seam
//!
//! The engine never touches audio or the network. It hands abstract events
//! to a controller, which maps cues to sound assets and turns a timeout into
//! the authoritative forfeit request.

use byoclock_core::{ClockResult, Color};

/// Consumer of the engine's side effects
pub trait SessionController {
    /// Play the named countdown cue for `color`
    fn beep(&mut self, color: Color, cue: &str);

    /// `color` exhausted its time. The controller performs the forfeit and
    /// later corrects the clock with a fresh snapshot.
    fn timeout(&mut self, color: Color);

    /// Ask the authority to pause or resume the game.
    /// An error rolls back the optimistic local toggle.
    fn request_pause(&mut self, paused: bool) -> ClockResult<()> {
        let _ = paused;
        Ok(())
    }
}

impl<T: SessionController + ?Sized> SessionController for Box<T> {
    fn beep(&mut self, color: Color, cue: &str) {
        (**self).beep(color, cue)
    }

    fn timeout(&mut self, color: Color) {
        (**self).timeout(color)
    }

    fn request_pause(&mut self, paused: bool) -> ClockResult<()> {
        (**self).request_pause(paused)
    }
}
