use bevy::prelude::*;
use bevy_replicon::prelude::*;
use bevy_replicon_pawns::prelude::*;

const BOB: u64 = 42;

#[derive(Component, Default)]
struct Walker;

impl Pawn for Walker {}

fn host_app(auto_spawn_clients: bool) -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        RepliconPlugins.build().disable::<ClientPlugin>(),
    ))
    .add_plugins(PawnsPlugin{
        host_display_name: "host".to_string(),
        auto_spawn_clients
    })
    .insert_resource(Session::host());
    app
}

fn client_events(app: &App) -> Vec<ClientEvent> {
    let events = app.world().resource::<Events<ClientEvent>>();
    events.get_reader().read(events).copied().collect()
}

fn connect(app: &mut App, client_id: ClientId) {
    app.world_mut().send_event(ServerEvent::ClientConnected { client_id });
    app.update();
}

fn disconnect(app: &mut App, client_id: ClientId) {
    app.world_mut().send_event(ServerEvent::ClientDisconnected { 
        client_id, 
        reason: "left".to_string() 
    });
    app.update();
}

#[test]
fn connection_spawns_and_disconnection_tears_down_client() {
    let mut app = host_app(true);
    let bob = ClientId::new(BOB);

    connect(&mut app, bob);
    let client = *app.world().resource::<ConnectionClientMap>()
    .get(&bob)
    .unwrap();
    assert_eq!(
        client_events(&app), 
        vec![ClientEvent::Spawned { connection: Some(bob), client }]
    );
    assert_eq!(app.world().get::<Client>(client).unwrap().connection_id(), Some(bob));
    assert_eq!(app.world().get::<Name>(client).unwrap().as_str(), "client 42 - CLIENT");

    let session = Session::host();
    let pawn = app.world_mut().spawn(PawnBundle::new(Walker)).id();
    app.world_mut().assign_pawn_from_existing(&session, client, pawn).unwrap();
    assert_eq!(app.world().get::<NetworkOwner>(pawn), Some(&NetworkOwner::new(bob)));

    disconnect(&mut app, bob);
    assert!(client_events(&app).contains(
        &ClientEvent::Despawned { connection: Some(bob), client }
    ));
    assert!(app.world().get_entity(client).is_none());
    assert!(app.world().get_entity(pawn).is_none());
    assert!(app.world().resource::<ConnectionClientMap>().get(&bob).is_none());
    assert!(!app.world().resource::<Connections>().contains(&bob));
}

#[test]
fn connection_without_auto_spawn_is_only_tracked() {
    let mut app = host_app(false);
    let bob = ClientId::new(BOB);

    connect(&mut app, bob);
    assert!(app.world().resource::<Connections>().contains(&bob));
    assert!(app.world().resource::<ConnectionClientMap>().get(&bob).is_none());
    assert!(client_events(&app).is_empty());

    let session = Session::host();
    let client = app.world_mut().spawn_client(&session, Some(bob)).unwrap();
    disconnect(&mut app, bob);
    assert!(app.world().get_entity(client).is_none());
}

#[test]
fn disconnection_clears_binding_of_vanished_client() {
    let mut app = host_app(true);
    let bob = ClientId::new(BOB);

    connect(&mut app, bob);
    let client = *app.world().resource::<ConnectionClientMap>()
    .get(&bob)
    .unwrap();
    app.world_mut().despawn(client);

    disconnect(&mut app, bob);
    assert!(app.world().resource::<ConnectionClientMap>().get(&bob).is_none());
}
