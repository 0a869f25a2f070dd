use err_derive::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Error)]
pub enum Error {
    #[error(display = "Text channel unavailable")]
    TextChannelUnavailable,

    #[error(display = "7-segment display not responding")]
    DisplayUnavailable,

    #[error(display = "Event not valid in current race state")]
    UnreachableState,
}
