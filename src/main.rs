mod app;
mod config;
mod library;
mod lyrics;
mod media;
mod mpris;
mod player;
mod prefs;
mod presentation;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
