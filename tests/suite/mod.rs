mod batch;
mod config;
mod timing;
