use bevy::prelude::*;
use bevy_replicon::prelude::*;

/// Role of the local participant.
/// Every mutating pawn operation takes the session explicitly
/// and only [`Session::Host`] is allowed to write ownership state.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Session {
    Host,
    Observer {
        connection: ClientId
    }
}

impl Session {
    #[inline]
    pub fn host() -> Self {
        Self::Host
    }

    #[inline]
    pub fn observer(connection: ClientId) -> Self {
        Self::Observer { connection }
    }

    #[inline]
    pub fn is_authority(&self) -> bool {
        matches!(self, Self::Host)
    }

    /// The authority's own connection.
    #[inline]
    pub fn authority_connection(&self) -> ClientId {
        ClientId::SERVER
    }

    #[inline]
    pub fn local_connection(&self) -> ClientId {
        match self {
            Self::Host => ClientId::SERVER,
            Self::Observer { connection } => *connection
        }
    }

    #[inline]
    pub fn is_local(&self, connection: &ClientId) -> bool {
        self.local_connection() == *connection
    }
}

pub fn is_host(session: Option<Res<Session>>) -> bool {
    session.is_some_and(|s| s.is_authority())
}

pub fn has_session(session: Option<Res<Session>>) -> bool {
    session.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_owns_server_connection() {
        let session = Session::host();
        assert!(session.is_authority());
        assert_eq!(session.local_connection(), ClientId::SERVER);
        assert!(session.is_local(&ClientId::SERVER));
    }

    #[test]
    fn observer_is_not_authority() {
        let session = Session::observer(ClientId::new(7));
        assert!(!session.is_authority());
        assert_eq!(session.local_connection(), ClientId::new(7));
        assert_eq!(session.authority_connection(), ClientId::SERVER);
        assert!(!session.is_local(&ClientId::SERVER));
    }
}
