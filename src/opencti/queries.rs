//! GraphQL documents sent to OpenCTI's `/graphql` endpoint.

pub const LATEST_REPORTS_QUERY: &str = r#"
query LatestReports($first: Int) {
  reports(first: $first, orderBy: published, orderMode: desc) {
    edges {
      node {
        id
        name
        description
        content
        published
        confidence
        created
        modified
        report_types
      }
    }
  }
}
"#;

pub const SEARCH_INDICATORS_QUERY: &str = r#"
query SearchIndicators($search: String, $first: Int) {
  stixCoreObjects(search: $search, first: $first, types: ["Indicator"]) {
    edges {
      node {
        id
        entity_type
        ... on Indicator {
          name
          description
          created
          modified
          pattern
          valid_from
          valid_until
          x_opencti_score
        }
      }
    }
  }
}
"#;

pub const SEARCH_MALWARE_QUERY: &str = r#"
query SearchMalware($search: String, $first: Int) {
  stixCoreObjects(search: $search, first: $first, types: ["Malware"]) {
    edges {
      node {
        id
        entity_type
        ... on Malware {
          name
          description
          created
          modified
          malware_types
          is_family
          first_seen
          last_seen
        }
      }
    }
  }
}
"#;

pub const SEARCH_THREAT_ACTORS_QUERY: &str = r#"
query SearchThreatActors($search: String, $first: Int) {
  stixCoreObjects(search: $search, first: $first, types: ["Threat-Actor"]) {
    edges {
      node {
        id
        entity_type
        ... on ThreatActor {
          name
          description
          created
          modified
          threat_actor_types
          first_seen
          last_seen
        }
      }
    }
  }
}
"#;
