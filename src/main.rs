use std::io;

use memoproc::app;
use memoproc::process::NativeHost;

fn main() {
    env_logger::init();

    let host = NativeHost::new();
    let code = app::dispatch(
        std::env::args_os(),
        &host,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
    );
    std::process::exit(code);
}
