fn main() {
    env_logger::init();

    let app = patisserie::default();
    app.run();
}
