//! Which side of the link this peer is on.

use wire::PlayerId;

/// Host drives car 0, client drives car 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    #[default]
    Host,
    Client,
}

impl Role {
    /// This peer's player id.
    #[must_use]
    pub const fn local_id(self) -> PlayerId {
        match self {
            Self::Host => PlayerId::HOST,
            Self::Client => PlayerId::CLIENT,
        }
    }

    /// The other peer's player id.
    #[must_use]
    pub const fn remote_id(self) -> PlayerId {
        match self {
            Self::Host => PlayerId::CLIENT,
            Self::Client => PlayerId::HOST,
        }
    }

    /// Car slot driven by this peer.
    #[must_use]
    pub const fn local_slot(self) -> usize {
        self.local_id().raw() as usize
    }

    /// Car slot driven by the other peer.
    #[must_use]
    pub const fn remote_slot(self) -> usize {
        self.remote_id().raw() as usize
    }

    #[must_use]
    pub const fn is_host(self) -> bool {
        matches!(self, Self::Host)
    }
}
