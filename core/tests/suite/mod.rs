mod gateway;
mod project;
mod session;
