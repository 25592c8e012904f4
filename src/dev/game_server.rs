use bevy::prelude::*;
use bevy_replicon::prelude::*;
use bevy_replicon_renet::renet::transport::NetcodeServerTransport;
use bevy_replicon_renet::renet::ClientId as RenetClientId;
use anyhow::anyhow;
use crate::{
    dev::{
        config::*,
        *
    },
    prelude::*
};

pub struct GameServerPlugin;

impl Plugin for GameServerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(GameCommonPlugin)
        .register_pawn_template::<ExamplePawn>(
            EXAMPLE_PAWN_PATH, 
            example_pawn_template()
        )
        .insert_resource(PawnSwapTimer(Timer::from_seconds(
            DEV_PAWN_SWAP_SECONDS, 
            TimerMode::Repeating
        )))
        .add_systems(PreUpdate, 
            handle_server_event
            .after(PawnServerSet::TrackConnections)
            .before(PawnServerSet::ManageClients)
        )
        .add_systems(Update, (
            handle_transport_error,
            handle_client_event,
            swap_pawns,
            handle_pawn_event
        ).chain());
    }
}

#[derive(Resource)]
pub struct PawnSwapTimer(Timer);

fn handle_server_event(
    mut events: EventReader<ServerEvent>,
    mut connections: ResMut<Connections>,
    netcode_server: Res<NetcodeServerTransport>
) {
    for e in events.read() {
        match e {
            ServerEvent::ClientConnected { client_id } => {
                let user_data = match netcode_server.user_data(
                    RenetClientId::from_raw(client_id.get())
                ) {
                    Some(u) => u,
                    None => {
                        error(anyhow!("no user data for client: {}", client_id.get()));
                        return;
                    }
                };

                let (uuid, display_name) = match decode_user_data(&user_data) {
                    Ok(d) => d,
                    Err(e) => {
                        warn!("client: {} sent malformed user data, {e}", client_id.get());
                        continue;
                    }
                };

                connections.rename(client_id, display_name.clone());
                if let Some(c) = connections.get_mut(client_id) {
                    c.set_uuid(uuid);
                }
                info!("client: {client_id:?} uuid: {uuid} connected as {display_name}");
            }
            ServerEvent::ClientDisconnected { client_id, reason } => {
                info!("client: {client_id:?} disconnected with reason: {reason}");
            }
        }
    }
}

fn handle_client_event(
    mut commands: Commands,
    mut events: EventReader<ClientEvent>,
    session: Res<Session>
) {
    for e in events.read() {
        if let &ClientEvent::Spawned { client, .. } = e {
            commands.assign_pawn(*session, client, PawnSource::of::<ExamplePawn>());
        }
    }
}

fn swap_pawns(
    mut commands: Commands,
    mut timer: ResMut<PawnSwapTimer>,
    query: Query<Entity, With<Client>>,
    session: Res<Session>,
    time: Res<Time>
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }

    for client in query.iter() {
        commands.assign_pawn(*session, client, PawnSource::of::<ExamplePawn>());
    }
}

fn handle_pawn_event(
    mut events: EventReader<PawnEvent>,
    names: Query<&Name>
) {
    for e in events.read() {
        match e {
            &PawnEvent::Assigned { client, pawn } => {
                let name = names.get(pawn)
                .map(|n| n.as_str())
                .unwrap_or_default();
                info!("client: {client:?} possesses pawn: {pawn:?} {name}");
            }
            &PawnEvent::Unassigned { client, pawn } => {
                info!("client: {client:?} released pawn: {pawn:?}");
            }
        }
    }
}
