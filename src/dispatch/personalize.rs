use std::borrow::Cow;

use super::recipients::Recipient;

pub const NAME_PLACEHOLDER: &str = "[Name]";

/// Fills every `[Name]` with the recipient's display name. Without a name
/// the template is returned untouched, placeholder included.
pub fn personalize<'a>(template: &'a str, recipient: &Recipient) -> Cow<'a, str> {
    if recipient.display_name.is_empty() || !template.contains(NAME_PLACEHOLDER) {
        Cow::Borrowed(template)
    } else {
        Cow::Owned(template.replace(NAME_PLACEHOLDER, &recipient.display_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_occurrence() {
        let recipient = Recipient::new("ann@x.com", "Ann");

        let body = personalize("Hi [Name]! See you soon, [Name]. [Name]?", &recipient);

        assert_eq!(body, "Hi Ann! See you soon, Ann. Ann?");
    }

    #[test]
    fn empty_name_keeps_placeholder() {
        let recipient = Recipient::new("bob@y.com", "");
        let template = "Hello [Name]";

        let body = personalize(template, &recipient);

        assert_eq!(body, template);
        assert!(matches!(body, Cow::Borrowed(_)));
    }

    #[test]
    fn template_without_placeholder_is_unchanged() {
        let recipient = Recipient::new("ann@x.com", "Ann");
        assert_eq!(personalize("Hello team", &recipient), "Hello team");
    }

    #[test]
    fn placeholder_is_case_sensitive() {
        let recipient = Recipient::new("ann@x.com", "Ann");
        assert_eq!(personalize("Hi [name]", &recipient), "Hi [name]");
    }
}
