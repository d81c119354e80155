use {
    anyhow::Result,
    relaybot_gateway::{
        SignatureCodec,
        auth::{SIGNATURE_HEADER, TIMESTAMP_HEADER},
    },
    secrecy::Secret,
};

/// Print the `/send` auth headers for `body`, e.g. for a curl smoke test.
pub fn handle_sign(secret: &Secret<String>, body: &str, timestamp: Option<i64>) -> Result<()> {
    let now = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
    print!("{}", render_headers(secret, body, now)?);
    Ok(())
}

fn render_headers(secret: &Secret<String>, body: &str, now: i64) -> Result<String> {
    let codec =
        SignatureCodec::new(secret).map_err(|e| anyhow::anyhow!("invalid signing key: {e}"))?;
    let (ts, sig) = codec.signed_headers(body.as_bytes(), now);
    Ok(format!("{TIMESTAMP_HEADER}: {ts}\n{SIGNATURE_HEADER}: {sig}\n"))
}
