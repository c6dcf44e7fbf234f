use std::fmt;

/// Messages sent to a player over the course of a teleport.
///
/// `Display` gives the default English text; hosts with locale support can
/// match on the variant instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleportMessage {
    /// The countdown started.
    Delay {
        /// Seconds until the teleport happens.
        seconds: u32,
    },
    /// The player moved and the teleport was called off.
    Cancelled,
    /// The player arrived on their island.
    Arrived {
        /// Which home slot was used. Slot 1 is the main island.
        slot: u32,
    },
}

impl fmt::Display for TeleportMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delay { seconds } => {
                write!(f, "You will be teleported in {seconds} seconds. Don't move!")
            }
            Self::Cancelled => f.write_str("Teleport cancelled because you moved."),
            Self::Arrived { slot: 1 } => f.write_str("Teleported to your island"),
            Self::Arrived { slot } => write!(f, "Teleported to your island #{slot}"),
        }
    }
}
