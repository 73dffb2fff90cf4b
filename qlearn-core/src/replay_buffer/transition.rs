/// A single step of interaction, `(orig_state, res_state, action, reward, is_done)`.
///
/// `S` is the state representation, raw indices or an encoded vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    /// State in which the action was taken.
    pub orig_state: S,

    /// State the environment moved to.
    pub res_state: S,

    /// Action taken.
    pub action: usize,

    /// Immediate reward.
    pub reward: f32,

    /// Whether `res_state` is terminal.
    pub is_done: bool,
}

impl<S> Transition<S> {
    /// Constructs a transition.
    pub fn new(orig_state: S, res_state: S, action: usize, reward: f32, is_done: bool) -> Self {
        Self {
            orig_state,
            res_state,
            action,
            reward,
            is_done,
        }
    }
}
