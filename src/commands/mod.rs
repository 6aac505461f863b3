pub mod cat;
pub mod cd;
pub mod clear;
pub mod cp;
pub mod date;
pub mod head;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod pwd;
pub mod rm;
pub mod rmdir;
pub mod touch;
pub mod whoami;
