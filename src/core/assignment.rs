use std::any::{type_name, TypeId};
use bevy::prelude::*;
use bevy_replicon::prelude::*;
use crate::error::PawnError;
use super::{
    client::*,
    connection::*,
    network_owner::*,
    pawn::*,
    pawn_event::*,
    pawn_template::*,
    session::Session
};

/// Where the candidate pawn entity comes from.
#[derive(Clone)]
pub enum PawnSource {
    Template(PawnTemplate),
    Registered {
        type_id: TypeId,
        type_name: &'static str
    },
    Existing(Entity)
}

impl PawnSource {
    /// The template registered for `P`.
    #[inline]
    pub fn of<P: Pawn>() -> Self {
        Self::Registered {
            type_id: TypeId::of::<P>(),
            type_name: type_name::<P>()
        }
    }
}

/// Ownership operations on a [`World`].
///
/// Every mutating operation takes the [`Session`] it runs in and is rejected
/// unless it is the host. Failures are logged and leave prior state untouched,
/// a candidate pawn that fails validation is despawned.
pub trait PawnWorldExt {
    fn spawn_client(&mut self, session: &Session, connection: Option<ClientId>)
    -> Option<Entity>;

    /// Unassigns the client's pawn, then despawns the client.
    fn despawn_client(&mut self, session: &Session, client: Entity) -> bool;

    fn bind_connection(&mut self, session: &Session, client: Entity, connection: ClientId)
    -> bool;

    fn assign_pawn(&mut self, session: &Session, client: Entity, source: PawnSource)
    -> Option<Entity>;

    fn assign_pawn_from_template(
        &mut self,
        session: &Session,
        client: Entity,
        template: &PawnTemplate
    ) -> Option<Entity>;

    fn assign_pawn_by_type<P: Pawn>(&mut self, session: &Session, client: Entity)
    -> Option<Entity>;

    fn assign_pawn_from_existing(&mut self, session: &Session, client: Entity, entity: Entity)
    -> Option<Entity>;

    /// Returns the pawn whose unassign hook ran.
    fn unassign_pawn(&mut self, session: &Session, client: Entity) -> Option<Entity>;

    /// The stored reference, which may be stale.
    fn get_pawn(&self, client: Entity) -> Option<Entity>;

    fn get_pawn_as<T: Component>(&self, client: Entity) -> Option<&T>;

    fn try_get_pawn<T: Component>(&self, client: Entity) -> Option<(Entity, &T)>;
}

impl PawnWorldExt for World {
    fn spawn_client(&mut self, session: &Session, connection: Option<ClientId>)
    -> Option<Entity> {
        report(try_spawn_client(self, session, connection))
    }

    fn despawn_client(&mut self, session: &Session, client: Entity) -> bool {
        report(try_despawn_client(self, session, client)).is_some()
    }

    fn bind_connection(&mut self, session: &Session, client: Entity, connection: ClientId)
    -> bool {
        report(try_bind_connection(self, session, client, connection)).is_some()
    }

    fn assign_pawn(&mut self, session: &Session, client: Entity, source: PawnSource)
    -> Option<Entity> {
        report(try_assign_pawn(self, session, client, source))
    }

    fn assign_pawn_from_template(
        &mut self,
        session: &Session,
        client: Entity,
        template: &PawnTemplate
    ) -> Option<Entity> {
        self.assign_pawn(session, client, PawnSource::Template(template.clone()))
    }

    fn assign_pawn_by_type<P: Pawn>(&mut self, session: &Session, client: Entity)
    -> Option<Entity> {
        self.assign_pawn(session, client, PawnSource::of::<P>())
    }

    fn assign_pawn_from_existing(&mut self, session: &Session, client: Entity, entity: Entity)
    -> Option<Entity> {
        self.assign_pawn(session, client, PawnSource::Existing(entity))
    }

    fn unassign_pawn(&mut self, session: &Session, client: Entity) -> Option<Entity> {
        report(try_unassign_pawn(self, session, client)).flatten()
    }

    fn get_pawn(&self, client: Entity) -> Option<Entity> {
        self.get::<Client>(client)
        .and_then(Client::pawn)
    }

    fn get_pawn_as<T: Component>(&self, client: Entity) -> Option<&T> {
        self.get_pawn(client)
        .and_then(|p| self.get::<T>(p))
    }

    fn try_get_pawn<T: Component>(&self, client: Entity) -> Option<(Entity, &T)> {
        let pawn = self.get_pawn(client)?;
        self.get::<T>(pawn)
        .map(|t| (pawn, t))
    }
}

#[inline]
fn report<T>(result: Result<T, PawnError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("{e}");
            None
        }
    }
}

#[inline]
fn ensure_authority(session: &Session, operation: &'static str)
-> Result<(), PawnError> {
    if session.is_authority() {
        Ok(())
    } else {
        Err(PawnError::NotAuthority(operation))
    }
}

#[inline]
fn client_of(world: &World, client: Entity) -> Result<Client, PawnError> {
    world.get::<Client>(client)
    .copied()
    .ok_or(PawnError::NotAClient(client))
}

fn display_name(world: &World, connection: &ClientId) -> String {
    world.get_resource::<Connections>()
    .and_then(|c| c.display_name(connection))
    .map(str::to_owned)
    .unwrap_or_else(|| default_display_name(connection))
}

fn entity_label(world: &World, entity: Entity) -> String {
    match world.get::<Name>(entity) {
        Some(name) => name.as_str().to_owned(),
        None => format!("{entity:?}")
    }
}

fn try_spawn_client(world: &mut World, session: &Session, connection: Option<ClientId>)
-> Result<Entity, PawnError> {
    ensure_authority(session, "spawn_client")?;

    let client = world.spawn(ClientBundle::default()).id();
    match connection {
        Some(c) => {
            if let Err(e) = try_bind_connection(world, session, client, c) {
                world.despawn(client);
                return Err(e);
            }
        }
        None => {
            world.entity_mut(client)
            .insert(Name::new("CLIENT"));
        }
    }

    send_event(world, ClientEvent::Spawned { connection, client });
    info!("client: {client:?} spawned for connection: {:?}", connection.map(|c| c.get()));
    Ok(client)
}

fn try_despawn_client(world: &mut World, session: &Session, client: Entity)
-> Result<(), PawnError> {
    ensure_authority(session, "despawn_client")?;
    let current = client_of(world, client)?;

    if let Some(pawn) = current.pawn() {
        release_pawn(world, client, pawn);
    }

    let connection = current.connection_id();
    if let Some(c) = connection {
        if let Some(mut map) = world.get_resource_mut::<ConnectionClientMap>() {
            if map.get(&c) == Some(&client) {
                map.remove(&c);
            }
        }
    }

    if let Some(entity_mut) = world.get_entity_mut(client) {
        entity_mut.despawn_recursive();
    }

    send_event(world, ClientEvent::Despawned { connection, client });
    info!("client: {client:?} despawned");
    Ok(())
}

fn try_bind_connection(
    world: &mut World,
    session: &Session,
    client: Entity,
    connection: ClientId
) -> Result<(), PawnError> {
    ensure_authority(session, "bind_connection")?;
    let current = client_of(world, client)?;

    let name = world.get_resource::<Connections>()
    .and_then(|c| c.display_name(&connection))
    .map(str::to_owned)
    .ok_or(PawnError::UnknownConnection(connection))?;

    // a binding left behind by a client despawned outside despawn_client
    let stale = world.get_resource::<ConnectionClientMap>()
    .and_then(|m| m.get(&connection).copied())
    .filter(|&bound| bound != client && world.get::<Client>(bound).is_none());

    {
        let mut map = world.get_resource_or_insert_with(ConnectionClientMap::default);
        if let Some(bound) = stale {
            map.remove(&connection);
            debug!("connection: {} released from stale client: {bound:?}", connection.get());
        }
        map.try_insert(connection, client)?;
        if let Some(previous) = current.connection_id() {
            if previous != connection && map.get(&previous) == Some(&client) {
                map.remove(&previous);
            }
        }
    }

    let mut entity_mut = world.entity_mut(client);
    if let Some(mut c) = entity_mut.get_mut::<Client>() {
        c.set_connection_id(connection);
    }
    entity_mut.insert(Name::new(format!("{name} - CLIENT")));

    debug!("client: {client:?} bound to connection: {}", connection.get());
    Ok(())
}

fn try_assign_pawn(
    world: &mut World,
    session: &Session,
    client: Entity,
    source: PawnSource
) -> Result<Entity, PawnError> {
    let (candidate, expected) = match source {
        PawnSource::Existing(entity) => (entity, None),
        PawnSource::Template(template) => (template.instantiate(world), None),
        PawnSource::Registered { type_id, type_name } => {
            let template = world.get_resource::<PawnTemplates>()
            .and_then(|t| t.template_of_id(&type_id))
            .cloned()
            .ok_or(PawnError::NoTemplate(type_name))?;
            (template.instantiate(world), Some((type_id, type_name)))
        }
    };

    let validated = validate_candidate(world, session, client, candidate, expected)
    .and_then(|(current, capability)| {
        commit_candidate(world, session, client, current, candidate, capability)
    });

    if validated.is_err() {
        // never leave an orphaned candidate behind
        if let Some(entity_mut) = world.get_entity_mut(candidate) {
            entity_mut.despawn_recursive();
        }
    }
    validated
}

fn validate_candidate(
    world: &World,
    session: &Session,
    client: Entity,
    candidate: Entity,
    expected: Option<(TypeId, &'static str)>
) -> Result<(Client, PawnCapability), PawnError> {
    ensure_authority(session, "assign_pawn")?;
    let current = client_of(world, client)?;

    let capability = world.get::<PawnCapability>(candidate)
    .copied()
    .ok_or_else(|| PawnError::MissingCapability(entity_label(world, candidate)))?;

    if let Some((type_id, type_name)) = expected {
        if capability.pawn_type_id() != type_id {
            return Err(PawnError::TypeMismatch {
                expected: type_name,
                found: capability.pawn_type_name()
            });
        }
    }

    Ok((current, capability))
}

fn commit_candidate(
    world: &mut World,
    session: &Session,
    client: Entity,
    current: Client,
    candidate: Entity,
    capability: PawnCapability
) -> Result<Entity, PawnError> {
    let other = world.get::<AssignedTo>(candidate)
    .map(AssignedTo::client)
    .filter(|o| *o != client);
    if let Some(other) = other {
        detach_from(world, other, candidate);
    }

    if let Some(previous) = current.pawn() {
        if previous != candidate {
            release_pawn(world, client, previous);
        }
    }

    // the previous pawn's hook may have taken the candidate with it
    if world.get_entity(candidate).is_none() {
        if let Some(mut c) = world.get_mut::<Client>(client) {
            c.set_pawn(None);
        }
        return Err(PawnError::Despawned(candidate));
    }

    let owner = owning_connection(world, session, &current);
    match establish_ownership(world, candidate, owner) {
        Ownership::Registered => {
            debug!("pawn: {candidate:?} registered under connection: {}", owner.get());
        }
        Ownership::Transferred { from } => {
            debug!(
                "pawn: {candidate:?} transferred from connection: {:?} to: {}",
                from.map(|c| c.get()), owner.get()
            );
        }
    }
    label_pawn(world, candidate, &owner);

    if let Some(mut c) = world.get_mut::<Client>(client) {
        c.set_pawn(Some(candidate));
    }
    world.entity_mut(candidate)
    .insert(AssignedTo::new(client));
    capability.assign(world, candidate, client);

    send_event(world, PawnEvent::Assigned { client, pawn: candidate });
    info!(
        "pawn: {candidate:?} ({}) assigned to client: {client:?}",
        capability.pawn_type_name()
    );
    Ok(candidate)
}

fn detach_from(world: &mut World, other: Entity, pawn: Entity) {
    let detached = match world.get_mut::<Client>(other) {
        Some(mut c) if c.pawn() == Some(pawn) => {
            c.set_pawn(None);
            true
        }
        _ => false
    };

    if detached {
        send_event(world, PawnEvent::Unassigned { client: other, pawn });
        debug!("pawn: {pawn:?} detached from client: {other:?}");
    }
}

fn release_pawn(world: &mut World, client: Entity, pawn: Entity) -> bool {
    let capability = match world.get::<PawnCapability>(pawn) {
        Some(c) => *c,
        None => return false
    };

    capability.unassign(world, pawn);
    if let Some(mut entity_mut) = world.get_entity_mut(pawn) {
        entity_mut.remove::<AssignedTo>();
    }

    send_event(world, PawnEvent::Unassigned { client, pawn });
    debug!("pawn: {pawn:?} unassigned from client: {client:?}");
    true
}

fn owning_connection(world: &World, session: &Session, client: &Client) -> ClientId {
    client.connection_id()
    .filter(|c| {
        world.get_resource::<Connections>()
        .is_some_and(|connections| connections.contains(c))
    })
    .unwrap_or_else(|| session.authority_connection())
}

fn label_pawn(world: &mut World, pawn: Entity, owner: &ClientId) {
    let display = display_name(world, owner);
    let mut entity_mut = world.entity_mut(pawn);
    let spawned = match entity_mut.get::<SpawnedName>() {
        Some(s) => s.get().to_owned(),
        None => {
            let s = match entity_mut.get::<Name>() {
                Some(n) => n.as_str().to_owned(),
                None => SpawnedName::UNNAMED.to_owned()
            };
            entity_mut.insert(SpawnedName::new(s.clone()));
            s
        }
    };
    entity_mut.insert(Name::new(format!("{display} - {spawned}")));
}

fn try_unassign_pawn(world: &mut World, session: &Session, client: Entity)
-> Result<Option<Entity>, PawnError> {
    ensure_authority(session, "unassign_pawn")?;
    let current = client_of(world, client)?;

    let pawn = match current.pawn() {
        Some(p) => p,
        None => return Ok(None)
    };

    let released = release_pawn(world, client, pawn);
    if let Some(mut c) = world.get_mut::<Client>(client) {
        c.set_pawn(None);
    }
    Ok(released.then_some(pawn))
}

/// Deferred versions of the [`PawnWorldExt`] operations for use inside systems.
pub trait PawnCommandsExt {
    fn spawn_client(&mut self, session: Session, connection: Option<ClientId>);

    fn despawn_client(&mut self, session: Session, client: Entity);

    fn bind_connection(&mut self, session: Session, client: Entity, connection: ClientId);

    fn assign_pawn(&mut self, session: Session, client: Entity, source: PawnSource);

    fn unassign_pawn(&mut self, session: Session, client: Entity);
}

impl PawnCommandsExt for Commands<'_, '_> {
    fn spawn_client(&mut self, session: Session, connection: Option<ClientId>) {
        self.add(move |world: &mut World| {
            world.spawn_client(&session, connection);
        });
    }

    fn despawn_client(&mut self, session: Session, client: Entity) {
        self.add(move |world: &mut World| {
            world.despawn_client(&session, client);
        });
    }

    fn bind_connection(&mut self, session: Session, client: Entity, connection: ClientId) {
        self.add(move |world: &mut World| {
            world.bind_connection(&session, client, connection);
        });
    }

    fn assign_pawn(&mut self, session: Session, client: Entity, source: PawnSource) {
        self.add(move |world: &mut World| {
            world.assign_pawn(&session, client, source);
        });
    }

    fn unassign_pawn(&mut self, session: Session, client: Entity) {
        self.add(move |world: &mut World| {
            world.unassign_pawn(&session, client);
        });
    }
}

pub(crate) fn manage_clients_system(
    mut commands: Commands,
    mut server_events: EventReader<ServerEvent>,
    session: Res<Session>,
    settings: Res<PawnSettings>,
    mut client_map: ResMut<ConnectionClientMap>
) {
    for e in server_events.read() {
        match e {
            &ServerEvent::ClientConnected { client_id } => {
                if settings.auto_spawn_clients {
                    commands.spawn_client(*session, Some(client_id));
                }
            }
            ServerEvent::ClientDisconnected { client_id, .. } => {
                // the entry goes even if the client is already gone
                if let Some(client) = client_map.remove(client_id) {
                    commands.despawn_client(*session, client);
                }
            }
        }
    }
}

#[derive(Resource, Clone, Debug)]
pub struct PawnSettings {
    pub auto_spawn_clients: bool
}
