pub mod claim;
pub mod delete;
pub mod history;
pub mod leaderboard;
pub mod login;
pub mod me;
pub mod register;
pub mod seed;
