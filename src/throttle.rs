use std::thread;
use std::time::Duration;

use log::debug;
use rand::Rng;

/// Jittered pause between index-page fetches so the walk does not hammer
/// the site. Not applied before the first page.
pub fn page_delay() {
    let delay_secs = rand::thread_rng().gen_range(1..=3);
    debug!("Waiting {} seconds before next index page...", delay_secs);
    thread::sleep(Duration::from_secs(delay_secs));
}
