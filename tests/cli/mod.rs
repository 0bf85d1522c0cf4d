pub mod support;

mod backup;
mod check;
mod clean;
mod estimate;
mod migrate;
mod restore;
mod verify;
