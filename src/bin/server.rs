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
    dev::game_server::*, 
    dev::config::*
};

fn main() {
    let mut app = App::new();
    let builder = RenetServerBuilder{
        network_tick_rate: DEV_NETWORK_TICK_RATE,
        listen_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
        listen_port: DEV_SERVER_LISTEN_PORT,
        protocol_id: get_dev_protocol_id(),
        private_key: get_dev_private_key(),
        max_clients: DEV_SERVER_MAX_CLIENTS,
    };
    
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f32(DEV_SERVER_TICK_DELTA)
        )),
        LogPlugin{
            level: LOG_LEVEL,
            ..default()
        }
    ))
    .add_plugins(builder.build_plugins())
    .add_plugins(PawnsPlugin{
        host_display_name: DEV_HOST_DISPLAY_NAME.to_string(),
        auto_spawn_clients: true
    })
    .add_plugins(GameServerPlugin);

    match builder.build_transport(app.world_mut()) {
        Ok(()) => app.run(),
        Err(e) => panic!("{e}")
    };
}
