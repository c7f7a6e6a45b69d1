pub mod geocoder;
pub mod jwt;
pub mod password;
pub mod seed;
pub mod storage;
