use std::{
    net::{IpAddr, Ipv4Addr}, 
    time::Duration
};
use bevy::{
    app::ScheduleRunnerPlugin, 
    log::LogPlugin, 
    prelude::*
};
use bevy_replicon_pawns::{
    prelude::*,
    dev::game_client::*,
    dev::config::*,
    dev::encode_user_data
};
use uuid::Uuid;

fn main() {
    let client_id = rand::random::<u64>();
    let display_name = std::env::args()
    .nth(1)
    .unwrap_or_else(|| format!("player-{}", client_id % 10_000));
    let user_data = match encode_user_data(&Uuid::new_v4(), &display_name) {
        Ok(u) => u,
        Err(e) => panic!("{e}")
    };

    let mut app = App::new();
    let builder = RenetClientBuilder{
        client_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
        server_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
        server_port: DEV_SERVER_LISTEN_PORT,
        timeout_seconds: DEV_CLIENT_TIME_OUT_SEC,
        client_id,
        protocol_id: get_dev_protocol_id(),
        private_key: get_dev_private_key(),
        user_data,
        token_expire_seconds: DEV_TOKEN_EXPIRE_SEC,
    };
    
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f32(DEV_CLIENT_TICK_DELTA)
        )),
        LogPlugin{
            level: LOG_LEVEL,
            ..default()
        }
    ))
    .add_plugins(builder.build_plugins())
    .add_plugins(PawnsPlugin::default())
    .add_plugins(GameClientPlugin);

    match builder.build_transport(app.world_mut()) {
        Ok(()) => app.run(),
        Err(e) => panic!("{e}")
    };
}
