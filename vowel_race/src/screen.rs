/// Where a round renders its progress. Implemented by the terminal in the
/// game.
pub trait Screen {
    /// Called once before the first frame of every round.
    fn begin_round(&mut self) {}
    fn clear(&mut self);
    fn show(&mut self, lines: &[String]);
}
