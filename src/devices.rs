#[cfg_attr(test, mockall::automock)]
/// The host side of the machine, responsible for showing frames and playing sound.
///
/// Neither call may block, the machine waits for both to return before it
/// continues with the next tick.
pub trait Renderer {
    /// Will draw a full frame, `pixels` holds one 0 or 1 per cell row by row.
    fn render(&mut self, pixels: &[u8]);
    /// Will play the tone the sound timer signals when it runs out.
    fn beep(&mut self);
}
