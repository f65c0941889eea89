//! Inbound line classification
//!
//! Decides what a message body asks for. The body arrives already
//! separated from the sender's identity, so no display-string parsing
//! is involved.

/// What a message body asks the server to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `/logout`, any case
    Logout,
    /// `/online`, any case
    OnlineQuery,
    /// `@name text`: deliver to the first session called `name`
    PrivateMessage { target: &'a str },
    /// Everything else, including the empty body
    Broadcast,
}

/// Classify one message body
pub fn classify(body: &str) -> Command<'_> {
    if body.eq_ignore_ascii_case("/logout") {
        return Command::Logout;
    }
    if body.eq_ignore_ascii_case("/online") {
        return Command::OnlineQuery;
    }
    if let Some(rest) = body.trim_start().strip_prefix('@') {
        let target = rest.split(char::is_whitespace).next().unwrap_or("");
        return Command::PrivateMessage { target };
    }
    Command::Broadcast
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_logout() {
        assert_eq!(classify("/logout"), Command::Logout);
        assert_eq!(classify("/LogOut"), Command::Logout);
        // Exact match only
        assert_eq!(classify("/logout now"), Command::Broadcast);
        assert_eq!(classify(" /logout"), Command::Broadcast);
    }

    #[test]
    fn test_classify_online() {
        assert_eq!(classify("/online"), Command::OnlineQuery);
        assert_eq!(classify("/ONLINE"), Command::OnlineQuery);
        assert_eq!(classify("/onlinex"), Command::Broadcast);
    }

    #[test]
    fn test_classify_private() {
        assert_eq!(
            classify("@bob hey there"),
            Command::PrivateMessage { target: "bob" }
        );
        assert_eq!(
            classify("   @bob\thi"),
            Command::PrivateMessage { target: "bob" }
        );
        assert_eq!(classify("@bob"), Command::PrivateMessage { target: "bob" });
        // Targets are case-sensitive, taken verbatim
        assert_eq!(classify("@Bob x"), Command::PrivateMessage { target: "Bob" });
    }

    #[test]
    fn test_classify_private_without_name() {
        assert_eq!(classify("@"), Command::PrivateMessage { target: "" });
        assert_eq!(classify("@ hi"), Command::PrivateMessage { target: "" });
    }

    #[test]
    fn test_classify_broadcast() {
        assert_eq!(classify("hello everyone"), Command::Broadcast);
        assert_eq!(classify("mail me at bob@example.com"), Command::Broadcast);
        assert_eq!(classify("/unknown"), Command::Broadcast);
    }

    #[test]
    fn test_classify_empty_body() {
        assert_eq!(classify(""), Command::Broadcast);
        assert_eq!(classify("   "), Command::Broadcast);
    }
}
