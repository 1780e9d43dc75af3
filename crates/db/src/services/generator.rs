use rand::Rng;

const TOKEN_LENGTH: usize = 40;

fn random_string(length: usize) -> String {
    // A character set that omits visually similar characters (e.g., 'i', 'l', 'o', '0', '1')
    // so tokens survive being read aloud or copied by hand.
    const CHARSET: &str = "abcdefghjkmnpqrstuvwxyzABCDEFGHJKMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET.as_bytes()[idx] as char
        })
        .collect()
}

/// Generates an opaque bearer token for a new session.
pub fn generate_session_token() -> String {
    random_string(TOKEN_LENGTH)
}
