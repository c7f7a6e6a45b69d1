use std::convert::Infallible;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use query_core::ParamMap;

/// Raw query string of a list request as a [`ParamMap`].
///
/// Never rejects: malformed pairs are skipped and interpretation is left to
/// the translator. Usage in handlers:
///   async fn list(AdvancedParams(params): AdvancedParams, /* ... */) { /* ... */ }
#[derive(Debug, Clone, Default)]
pub struct AdvancedParams(pub ParamMap);

impl AdvancedParams {
    #[inline]
    pub fn into_inner(self) -> ParamMap {
        self.0
    }
}

impl Deref for AdvancedParams {
    type Target = ParamMap;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<AdvancedParams> for ParamMap {
    #[inline]
    fn from(x: AdvancedParams) -> Self {
        x.0
    }
}

impl<S> FromRequestParts<S> for AdvancedParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let params = parts
            .uri
            .query()
            .map(ParamMap::from_query_str)
            .unwrap_or_default();
        async move { Ok(AdvancedParams(params)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use query_core::ParamValue;

    async fn extract(uri: &str) -> ParamMap {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        let AdvancedParams(p) = AdvancedParams::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        p
    }

    #[tokio::test]
    async fn parses_bracket_syntax() {
        let p = extract("/api/v1/courses?tuition[gte]=5000&select=title").await;
        match p.get("tuition") {
            Some(ParamValue::Map(m)) => assert_eq!(m.get("gte"), Some(&ParamValue::from("5000"))),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(p.get("select").and_then(ParamValue::first), Some("title"));
    }

    #[tokio::test]
    async fn no_query_is_empty() {
        assert!(extract("/api/v1/courses").await.is_empty());
    }
}
