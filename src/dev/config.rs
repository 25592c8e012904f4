use bevy::log::Level;

pub const LOG_LEVEL: Level = Level::INFO;

pub const DEV_NETWORK_TICK_RATE: u16 = 30;
pub const DEV_SERVER_TICK_DELTA: f32 = 1.0 / 60.0;
pub const DEV_CLIENT_TICK_DELTA: f32 = 1.0 / 60.0;
pub const DEV_SERVER_LISTEN_PORT: u16 = 5000;
pub const DEV_SERVER_MAX_CLIENTS: usize = 10;
pub const DEV_CLIENT_TIME_OUT_SEC: i32 = 15;
pub const DEV_TOKEN_EXPIRE_SEC: u64 = 300;

pub const DEV_HOST_DISPLAY_NAME: &str = "dev host";
pub const DEV_PAWN_SWAP_SECONDS: f32 = 10.0;
pub const EXAMPLE_PAWN_PATH: &str = "pawns/example.pawn";
pub const EXAMPLE_PAWN_NAME: &str = "ExamplePawn";

#[inline]
pub fn get_dev_protocol_id() -> u64 {
    0x7061_776e_7331
}

#[inline]
pub fn get_dev_private_key() -> [u8; 32] {
    [
        0x70, 0x61, 0x77, 0x6e, 0x73, 0x2d, 0x64, 0x65,
        0x76, 0x2d, 0x6b, 0x65, 0x79, 0x2d, 0x6e, 0x6f,
        0x74, 0x2d, 0x66, 0x6f, 0x72, 0x2d, 0x70, 0x72,
        0x6f, 0x64, 0x75, 0x63, 0x74, 0x69, 0x6f, 0x6e
    ]
}
