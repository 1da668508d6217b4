use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use rand::{rngs::OsRng, RngCore};
use sha1::{Digest, Sha1};
use time::{macros::format_description, OffsetDateTime};

const PASSWORD_DIGEST_TYPE: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest";
const NONCE_ENCODING: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";
const NONCE_LEN: usize = 20;

/// WS-Security UsernameToken with a PasswordDigest, regenerated for every request.
pub struct UsernameToken {
    username: String,
    nonce: Vec<u8>,
    created: String,
    digest: String,
}

impl UsernameToken {
    pub fn generate(username: &str, password: &str) -> Result<Self> {
        let mut nonce = vec![0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let created = OffsetDateTime::now_utc()
            .format(&format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].000Z"
            ))
            .context("failed to format wsse created timestamp")?;
        Ok(Self::with_nonce(username, password, nonce, created))
    }

    fn with_nonce(username: &str, password: &str, nonce: Vec<u8>, created: String) -> Self {
        // Base64(SHA1(nonce + created + password))
        let mut hasher = Sha1::new();
        hasher.update(&nonce);
        hasher.update(created.as_bytes());
        hasher.update(password.as_bytes());
        let digest = general_purpose::STANDARD.encode(hasher.finalize());
        Self {
            username: username.to_string(),
            nonce,
            created,
            digest,
        }
    }

    pub fn header(&self) -> String {
        format!(
            r#"  <s:Header>
    <Security xmlns="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd" s:mustUnderstand="1">
      <UsernameToken>
        <Username>{username}</Username>
        <Password Type="{PASSWORD_DIGEST_TYPE}">{digest}</Password>
        <Nonce EncodingType="{NONCE_ENCODING}">{nonce}</Nonce>
        <Created xmlns="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">{created}</Created>
      </UsernameToken>
    </Security>
  </s:Header>
"#,
            username = xml_escape(&self.username),
            digest = self.digest,
            nonce = general_purpose::STANDARD.encode(&self.nonce),
            created = self.created,
        )
    }
}

pub fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod success {
    use super::{xml_escape, UsernameToken};

    #[test]
    fn digest_depends_on_every_input() {
        let created = "2024-01-01T00:00:00.000Z".to_string();
        let token = UsernameToken::with_nonce("admin", "secret", vec![1; 20], created.clone());
        let same = UsernameToken::with_nonce("admin", "secret", vec![1; 20], created.clone());
        let other_nonce = UsernameToken::with_nonce("admin", "secret", vec![2; 20], created.clone());
        let other_password = UsernameToken::with_nonce("admin", "Secret", vec![1; 20], created);

        assert_eq!(token.digest, same.digest);
        assert_ne!(token.digest, other_nonce.digest);
        assert_ne!(token.digest, other_password.digest);
        // 20-byte SHA-1 digest in base64
        assert_eq!(token.digest.len(), 28);
    }

    #[test]
    fn header_escapes_username() {
        let token = UsernameToken::generate("ops&<cam>", "pw").unwrap();
        let header = token.header();

        assert!(header.contains("<Username>ops&amp;&lt;cam&gt;</Username>"));
        assert!(header.contains("#PasswordDigest"));
        assert!(header.starts_with("  <s:Header>"));
    }

    #[test]
    fn escape_quotes() {
        assert_eq!(xml_escape(r#"a"b'c"#), "a&quot;b&apos;c");
    }
}
