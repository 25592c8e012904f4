use bevy::{
    prelude::*,
    utils::HashMap
};
use bevy_replicon::prelude::*;
use uuid::Uuid;
use crate::error::PawnError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    id: ClientId,
    display_name: String,
    uuid: Option<Uuid>
}

impl Connection {
    #[inline]
    pub fn new(id: ClientId, display_name: impl Into<String>) -> Self {
        Self{
            id,
            display_name: display_name.into(),
            uuid: None
        }
    }

    #[inline]
    pub fn set_uuid(&mut self, uuid: Uuid) {
        self.uuid = Some(uuid);
    }

    #[inline]
    pub fn id(&self) -> ClientId {
        self.id
    }

    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[inline]
    pub fn uuid(&self) -> Option<Uuid> {
        self.uuid
    }
}

/// Live connections of the session, including the authority's own.
#[derive(Resource)]
pub struct Connections(HashMap<ClientId, Connection>);

impl Connections {
    #[inline]
    pub fn new(host_display_name: impl Into<String>) -> Self {
        let mut map = HashMap::default();
        map.insert(
            ClientId::SERVER, 
            Connection::new(ClientId::SERVER, host_display_name)
        );
        Self(map)
    }

    #[inline]
    pub fn try_insert(&mut self, connection: Connection) 
    -> anyhow::Result<()> {
        if self.0.contains_key(&connection.id) {
            anyhow::bail!("connection {} is already registered", connection.id.get());
        }
        self.0.insert(connection.id, connection);
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: &ClientId) -> Option<&Connection> {
        self.0.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: &ClientId) -> Option<&mut Connection> {
        self.0.get_mut(id)
    }

    #[inline]
    pub fn contains(&self, id: &ClientId) -> bool {
        self.0.contains_key(id)
    }

    #[inline]
    pub fn remove(&mut self, id: &ClientId) -> Option<Connection> {
        if *id == ClientId::SERVER {
            return None;
        }
        self.0.remove(id)
    }

    #[inline]
    pub fn rename(&mut self, id: &ClientId, display_name: impl Into<String>) 
    -> bool {
        match self.0.get_mut(id) {
            Some(c) => {
                c.display_name = display_name.into();
                true
            }
            None => false
        }
    }

    #[inline]
    pub fn display_name(&self, id: &ClientId) -> Option<&str> {
        self.0.get(id).map(|c| c.display_name())
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.0.values()
    }
}

impl Default for Connections {
    fn default() -> Self {
        Self::new("host")
    }
}

/// Which client entity each connection is bound to.
#[derive(Resource, Default)]
pub struct ConnectionClientMap(HashMap<ClientId, Entity>);

impl ConnectionClientMap {
    #[inline]
    pub fn try_insert(&mut self, connection: ClientId, client: Entity)
    -> Result<(), PawnError> {
        match self.0.get(&connection) {
            Some(&bound) if bound != client => {
                Err(PawnError::ConnectionTaken(connection, bound))
            }
            _ => {
                self.0.insert(connection, client);
                Ok(())
            }
        }
    }

    #[inline]
    pub fn get(&self, connection: &ClientId) -> Option<&Entity> {
        self.0.get(connection)
    }

    #[inline]
    pub fn remove(&mut self, connection: &ClientId) -> Option<Entity> {
        self.0.remove(connection)
    }
}

#[inline]
pub(crate) fn default_display_name(id: &ClientId) -> String {
    format!("client {}", id.get())
}

pub(crate) fn track_connections_system(
    mut server_events: EventReader<ServerEvent>,
    mut connections: ResMut<Connections>
) {
    for e in server_events.read() {
        match e {
            &ServerEvent::ClientConnected { client_id } => {
                let connection = Connection::new(
                    client_id, 
                    default_display_name(&client_id)
                );
                match connections.try_insert(connection) {
                    Ok(()) => debug!("connection: {} registered", client_id.get()),
                    Err(e) => warn!("{e}")
                }
            }
            ServerEvent::ClientDisconnected { client_id, .. } => {
                if let Some(c) = connections.remove(client_id) {
                    match c.uuid() {
                        Some(uuid) => info!("connection: {} ({uuid}) unregistered", client_id.get()),
                        None => debug!("connection: {} unregistered", client_id.get())
                    }
                }
            }
        }
    }
}
