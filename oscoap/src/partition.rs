//! Which options travel in the clear and which are sealed, consulted by both directions.
use url::Url;

use crate::message::{OptionSet, Role};
use crate::proto::*;

/// How an option is treated by the security transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionClass {
    /// Stays outside for proxies and the transport to read. Not authenticated.
    Unprotected,
    /// Stays outside but is bound into the AAD.
    IntegrityOnly,
    /// Encrypted and authenticated inside the envelope.
    Protected,
}

struct ClassRule {
    number: u16,
    request: OptionClass,
    response: OptionClass,
}

/// Every option not listed here is protected. The Observe option of a notification is also
/// mirrored into the integrity-only set, see `integrity_options`.
const OPTION_CLASSES: [ClassRule; 5] = [
    ClassRule { number: OPTION_URI_HOST, request: OptionClass::Unprotected, response: OptionClass::Unprotected },
    ClassRule { number: OPTION_OBSERVE, request: OptionClass::Unprotected, response: OptionClass::Unprotected },
    ClassRule { number: OPTION_URI_PORT, request: OptionClass::Unprotected, response: OptionClass::Unprotected },
    ClassRule { number: OPTION_PROXY_URI, request: OptionClass::Unprotected, response: OptionClass::Protected },
    ClassRule { number: OPTION_PROXY_SCHEME, request: OptionClass::Unprotected, response: OptionClass::Unprotected },
];

pub fn option_class(number: u16, role: Role) -> OptionClass {
    OPTION_CLASSES
        .iter()
        .find(|r| r.number == number)
        .map_or(OptionClass::Protected, |r| match role {
            Role::Response => r.response,
            _ => r.request,
        })
}

/// The options of an outgoing message, sorted into their classes.
pub(crate) struct Partition {
    pub outer: OptionSet,
    pub inner: OptionSet,
    /// A Proxy-Uri that could not be parsed and was dropped.
    pub dropped_proxy_uri: Option<Vec<u8>>,
}

/// The integrity-only options: empty for requests and ordinary responses, the low bits of the
/// sequence number as Observe for notifications.
pub(crate) fn integrity_options(notification_sequence: Option<u64>) -> OptionSet {
    let mut set = OptionSet::new();
    if let Some(seq) = notification_sequence {
        set.set_uint(OPTION_OBSERVE, seq & OBSERVE_VALUE_MASK);
    }
    set
}

/// Split `options` of an outgoing message into the outer and inner sets.
///
/// A Proxy-Uri is cut in two: scheme, host and port stay outside as a shortened Proxy-Uri,
/// path and query move inside as Uri-Path and Uri-Query. Responses additionally get an outer
/// Max-Age of zero so no proxy caches them.
pub(crate) fn split(options: OptionSet, role: Role) -> Partition {
    let mut outer = OptionSet::new();
    let mut inner = OptionSet::new();
    let mut dropped_proxy_uri = None;
    for option in &options {
        if option.number == OPTION_OBJECT_SECURITY {
            continue;
        }
        match option_class(option.number, role) {
            OptionClass::Unprotected if option.number == OPTION_PROXY_URI => match split_proxy_uri(&option.value) {
                Some((outer_uri, paths, queries)) => {
                    outer.add(OPTION_PROXY_URI, outer_uri);
                    for p in paths {
                        inner.add(OPTION_URI_PATH, p);
                    }
                    for q in queries {
                        inner.add(OPTION_URI_QUERY, q);
                    }
                }
                None => dropped_proxy_uri = Some(option.value.clone()),
            },
            OptionClass::Unprotected | OptionClass::IntegrityOnly => outer.add(option.number, option.value.clone()),
            OptionClass::Protected => inner.add(option.number, option.value.clone()),
        }
    }
    if role == Role::Response {
        outer.set_uint(OPTION_MAX_AGE, 0);
    }
    Partition { outer, inner, dropped_proxy_uri }
}

/// Rebuild the options of a received message from its outer options and the decrypted inner
/// ones. Only outer options classed unprotected survive, so an outer Max-Age or the
/// Object-Security option itself are gone afterwards.
pub(crate) fn merge(outer: &OptionSet, mut inner: OptionSet, role: Role) -> OptionSet {
    for option in outer {
        if option_class(option.number, role) != OptionClass::Unprotected {
            continue;
        }
        if option.number == OPTION_PROXY_URI {
            let uri = join_proxy_uri(&option.value, inner.take(OPTION_URI_PATH), inner.take(OPTION_URI_QUERY));
            inner.add(OPTION_PROXY_URI, uri);
        } else {
            inner.add(option.number, option.value.clone());
        }
    }
    inner
}

/// Split an absolute URI into `scheme://host[:port]`, its path segments and its query parts.
fn split_proxy_uri(value: &[u8]) -> Option<(String, Vec<String>, Vec<String>)> {
    let url = Url::parse(std::str::from_utf8(value).ok()?).ok()?;
    let host = url.host_str()?;
    let mut outer = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        outer.push_str(&format!(":{}", port));
    }
    let path = url.path().trim_start_matches('/');
    let paths = if path.is_empty() { Vec::new() } else { path.split('/').map(str::to_string).collect() };
    let queries = match url.query() {
        Some(q) if !q.is_empty() => q.split('&').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    Some((outer, paths, queries))
}

fn join_proxy_uri(outer: &[u8], paths: Vec<Vec<u8>>, queries: Vec<Vec<u8>>) -> Vec<u8> {
    let mut uri = outer.to_vec();
    if !paths.is_empty() {
        uri.push(b'/');
        uri.extend(paths.join(&b'/'));
    }
    if !queries.is_empty() {
        uri.push(b'?');
        uri.extend(queries.join(&b'&'));
    }
    uri
}
