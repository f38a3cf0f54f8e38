use url::Url;

/// Derives the address slug of a hotel from its display name
pub fn hotel_slug(hotel_name: &str) -> String {
    hotel_name.replace(' ', "-").to_lowercase()
}

/// Builds the hotel page address by substituting the slug into `template`.
///
/// Nothing checks that the resulting page exists.
pub fn hotel_url(template: &str, hotel_name: &str) -> Result<Url, url::ParseError> {
    Url::parse(&template.replace("{slug}", &hotel_slug(hotel_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "https://www.booking.com/hotel/pe/{slug}.es.html";

    #[test]
    fn test_hotel_slug() {
        assert_eq!(hotel_slug("Casa Andina Premium"), "casa-andina-premium");
        assert_eq!(hotel_slug("sonesta"), "sonesta");
    }

    #[test]
    fn test_hotel_url() {
        let url = hotel_url(TEMPLATE, "Casa Andina").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.booking.com/hotel/pe/casa-andina.es.html"
        );
    }

    #[test]
    fn test_bad_template() {
        assert!(hotel_url("not a url {slug}", "x").is_err());
    }
}
