pub fn init_logging(verbose: bool) {
    let default = if verbose { "deenbot_link=debug" } else { "deenbot_link=info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .init();
}
