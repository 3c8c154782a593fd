use ig_sessions::SessionKey;

/// Print a fresh base64 session key on stdout and its fingerprint on stderr,
/// so `idgate keygen > key` captures only the key.
pub fn run() {
    let key = SessionKey::generate();
    println!("{}", key.to_base64());
    eprintln!("fingerprint: {}", key.fingerprint());
}
