use super::handlers::{health, login, logout, me, signup};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Endpoints registered here through `routes!` are both served and documented.
pub(crate) fn api_router() -> OpenApiRouter {
    OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(login::login))
        .routes(routes!(logout::logout_get, logout::logout_post))
        .routes(routes!(signup::sign_up))
        .routes(routes!(me::me))
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    // Cargo joins multiple authors with ':'; the first one is the contact.
    info.contact = env!("CARGO_PKG_AUTHORS")
        .split(':')
        .next()
        .and_then(contact_from_author);
    info.license = optional_str(env!("CARGO_PKG_LICENSE")).map(|id| {
        let mut license = License::new(id);
        license.identifier = Some(id.to_string());
        license
    });

    OpenApiBuilder::new().info(info).tags(Some(tags())).build()
}

fn tags() -> Vec<Tag> {
    let mut health = Tag::new("health");
    health.description = Some("Service and user directory status".to_string());

    let mut auth = Tag::new("auth");
    auth.description = Some("Login, logout and sign-up".to_string());

    vec![health, auth]
}

/// `"Name <email>"`, `"Name"` or `"<email>"`.
fn contact_from_author(author: &str) -> Option<Contact> {
    let author = optional_str(author)?;
    let mut contact = Contact::new();
    match author.split_once('<') {
        Some((name, email)) => {
            contact.name = optional_str(name).map(str::to_string);
            contact.email = optional_str(email.trim_end_matches('>')).map(str::to_string);
        }
        None => contact.name = Some(author.to_string()),
    }
    Some(contact)
}

fn optional_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert_eq!(
            contact.as_ref().and_then(|c| c.name.as_deref()),
            Some("Team Blogauth")
        );
        assert_eq!(
            contact.as_ref().and_then(|c| c.email.as_deref()),
            Some("team@blogauth.dev")
        );
        assert_eq!(
            spec.info.license.map(|l| l.name),
            Some("BSD-3-Clause".to_string())
        );
    }

    #[test]
    fn openapi_documents_every_endpoint() {
        let spec = openapi();
        for path in ["/health", "/login", "/logout", "/sign-up", "/me"] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }

        let logout = spec.paths.paths.get("/logout");
        assert!(logout.is_some_and(|item| item.get.is_some() && item.post.is_some()));
    }

    #[test]
    fn openapi_declares_tags() {
        let names: Vec<String> = openapi()
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        assert_eq!(names, ["health", "auth"]);
    }

    #[test]
    fn contact_from_author_variants() {
        let contact = contact_from_author("Jane Doe <jane@example.com>");
        assert_eq!(
            contact.as_ref().and_then(|c| c.name.as_deref()),
            Some("Jane Doe")
        );
        assert_eq!(
            contact.as_ref().and_then(|c| c.email.as_deref()),
            Some("jane@example.com")
        );

        let contact = contact_from_author("<jane@example.com>");
        assert_eq!(contact.as_ref().and_then(|c| c.name.as_deref()), None);
        assert_eq!(
            contact.as_ref().and_then(|c| c.email.as_deref()),
            Some("jane@example.com")
        );

        let contact = contact_from_author("Jane Doe");
        assert_eq!(contact.and_then(|c| c.email), None);

        assert!(contact_from_author("  ").is_none());
    }
}
