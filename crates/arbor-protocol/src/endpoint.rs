use crate::error::{ProtocolError, ProtocolResult};

/// Version segment of every endpoint path.
pub const API_VERSION: &str = "v1";

/// Path prefix under the remote base URL, including the API version.
pub const REST_PREFIX: &str = "rest/arbor/v1";

/// The only content encoding the transport layer understands.
pub const GZIP_ENCODING: &str = "gzip";

/// Endpoint path templates, expanded with [`expand`].
///
/// `{store}` is the logical store name, `{node}` a node id, `{name}` an
/// attachment/dependency/series name, `{to}` a dependency target node id.
pub mod endpoints {
    pub const STORES: &str = "stores";
    pub const FLUSH: &str = "stores/{store}/flush";
    pub const ROOT_NODE: &str = "stores/{store}/rootNode";
    pub const NODE: &str = "stores/{store}/nodes/{node}";
    pub const NODE_WRITABLE: &str = "stores/{store}/nodes/{node}/writable";
    pub const NODE_DESCRIPTION: &str = "stores/{store}/nodes/{node}/description";
    pub const NODE_NAME: &str = "stores/{store}/nodes/{node}/name";
    pub const NODE_MODIFICATION_TIME: &str = "stores/{store}/nodes/{node}/modificationTime";
    pub const NODE_CHILDREN: &str = "stores/{store}/nodes/{node}/children";
    pub const NODE_CHILD: &str = "stores/{store}/nodes/{node}/children/{name}";
    pub const NODE_PARENT: &str = "stores/{store}/nodes/{node}/parent";
    pub const NODE_DATA_NAMES: &str = "stores/{store}/nodes/{node}/data";
    pub const NODE_DATA: &str = "stores/{store}/nodes/{node}/data/{name}";
    pub const NODE_DATA_EXISTS: &str = "stores/{store}/nodes/{node}/data/{name}/exists";
    pub const DEPENDENCIES: &str = "stores/{store}/nodes/{node}/dependencies";
    pub const DEPENDENCIES_NAMED: &str = "stores/{store}/nodes/{node}/dependencies/{name}";
    pub const DEPENDENCY_EDGE: &str = "stores/{store}/nodes/{node}/dependencies/{name}/{to}";
    pub const BACKWARD_DEPENDENCIES: &str = "stores/{store}/nodes/{node}/backwardDependencies";
    pub const TIME_SERIES: &str = "stores/{store}/nodes/{node}/timeSeries";
    pub const TIME_SERIES_NAMES: &str = "stores/{store}/nodes/{node}/timeSeries/name";
    pub const TIME_SERIES_EXISTS: &str = "stores/{store}/nodes/{node}/timeSeries/{name}";
    pub const TIME_SERIES_METADATA: &str = "stores/{store}/nodes/{node}/timeSeries/metadata";
    pub const TIME_SERIES_VERSIONS: &str = "stores/{store}/nodes/{node}/timeSeries/versions";
    pub const TIME_SERIES_NAMED_VERSIONS: &str =
        "stores/{store}/nodes/{node}/timeSeries/{name}/versions";
    pub const TIME_SERIES_DOUBLE_DATA: &str =
        "stores/{store}/nodes/{node}/timeSeries/double/{version}";
    pub const TIME_SERIES_STRING_DATA: &str =
        "stores/{store}/nodes/{node}/timeSeries/string/{version}";
}

/// Status conventions of the remote endpoint.
///
/// One success status; 204 distinguishes an absent attachment on a streamed
/// read; 500 is a server fault carrying a human-readable message. Anything
/// else is unexpected.
pub mod status {
    pub const OK: u16 = 200;
    pub const NO_CONTENT: u16 = 204;
    pub const SERVER_FAULT: u16 = 500;
}

/// Expand a path template, percent-encoding every substituted value.
///
/// Variables are `{name}` placeholders; each must be present in `vars`.
pub fn expand(template: &str, vars: &[(&str, &str)]) -> ProtocolResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| ProtocolError::UnterminatedTemplateVariable(template.to_string()))?;
        let key = &after[..close];
        let value = vars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| ProtocolError::UnknownTemplateVariable(key.to_string()))?;
        out.push_str(&urlencoding::encode(value));
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_single_variable() {
        let path = expand(endpoints::FLUSH, &[("store", "grid")]).unwrap();
        assert_eq!(path, "stores/grid/flush");
    }

    #[test]
    fn expand_multiple_variables() {
        let path = expand(
            endpoints::NODE_DATA,
            &[("store", "grid"), ("node", "n1"), ("name", "case.xml")],
        )
        .unwrap();
        assert_eq!(path, "stores/grid/nodes/n1/data/case.xml");
    }

    #[test]
    fn expand_percent_encodes_values() {
        let path = expand(
            endpoints::NODE_CHILD,
            &[("store", "grid"), ("node", "n1"), ("name", "a b/c")],
        )
        .unwrap();
        assert_eq!(path, "stores/grid/nodes/n1/children/a%20b%2Fc");
    }

    #[test]
    fn expand_missing_variable() {
        let err = expand(endpoints::NODE, &[("store", "grid")]).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownTemplateVariable(v) if v == "node"));
    }

    #[test]
    fn expand_unterminated_variable() {
        let err = expand("stores/{store", &[("store", "grid")]).unwrap_err();
        assert!(matches!(err, ProtocolError::UnterminatedTemplateVariable(_)));
    }

    #[test]
    fn expand_no_variables_is_identity() {
        assert_eq!(expand(endpoints::STORES, &[]).unwrap(), "stores");
    }

    #[test]
    fn status_conventions() {
        assert_eq!(status::OK, 200);
        assert_eq!(status::NO_CONTENT, 204);
        assert_eq!(status::SERVER_FAULT, 500);
    }
}
