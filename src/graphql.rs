use serde::{Deserialize, de::DeserializeOwned};

use crate::{error::Error, types::*};

const PULL_REQUEST_QUERY: &str = r#"
    query($owner: String!, $name: String!, $number: Int!) {
        repository(owner: $owner, name: $name) {
            pullRequest(number: $number) {
                id
                number
                title
                url
                state
                baseRepository {
                    id
                    nameWithOwner
                }
                headRef {
                    id
                    name
                }
                headRepository {
                    id
                    nameWithOwner
                }
            }
        }
    }
"#;

const SEARCH_QUERY: &str = r#"
    query($query: String!, $first: Int!, $after: String) {
        search(query: $query, type: ISSUE, first: $first, after: $after) {
            nodes {
                __typename
                ... on PullRequest {
                    number
                    title
                    state
                    url
                }
            }
            pageInfo {
                hasNextPage
                endCursor
            }
        }
    }
"#;

const ADD_COMMENT_MUTATION: &str = r#"
    mutation($subjectId: ID!, $body: String!) {
        addComment(input: { subjectId: $subjectId, body: $body }) {
            clientMutationId
        }
    }
"#;

const CLOSE_PULL_REQUEST_MUTATION: &str = r#"
    mutation($pullRequestId: ID!) {
        closePullRequest(input: { pullRequestId: $pullRequestId }) {
            pullRequest {
                state
            }
        }
    }
"#;

const DELETE_REF_MUTATION: &str = r#"
    mutation($refId: ID!) {
        deleteRef(input: { refId: $refId }) {
            clientMutationId
        }
    }
"#;

pub fn create_pull_request_query(repo: &Repo, number: u64) -> serde_json::Value {
    serde_json::json!({
        "query": PULL_REQUEST_QUERY,
        "variables": {
            "owner": repo.owner(),
            "name": repo.name(),
            "number": number,
        }
    })
}

pub fn create_search_query(search_query: &str, after: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "query": SEARCH_QUERY,
        "variables": {
            "query": search_query,
            "first": SEARCH_PAGE_SIZE,
            "after": after,
        }
    })
}

pub fn create_add_comment_mutation(subject_id: &str, body: &str) -> serde_json::Value {
    serde_json::json!({
        "query": ADD_COMMENT_MUTATION,
        "variables": { "subjectId": subject_id, "body": body }
    })
}

pub fn create_close_mutation(pull_request_id: &str) -> serde_json::Value {
    serde_json::json!({
        "query": CLOSE_PULL_REQUEST_MUTATION,
        "variables": { "pullRequestId": pull_request_id }
    })
}

pub fn create_delete_ref_mutation(ref_id: &str) -> serde_json::Value {
    serde_json::json!({
        "query": DELETE_REF_MUTATION,
        "variables": { "refId": ref_id }
    })
}

/// Top-level GraphQL envelope. GitHub answers most failures with HTTP 200
/// and an `errors` array, sometimes alongside partial data.
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: String,
}

impl<T> GraphQLResponse<T> {
    /// Returns the payload, or the typed error the `errors` array maps to.
    pub fn into_data(self) -> Result<T, Error> {
        if let Some(first) = self.errors.first() {
            let message = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(match first.kind.as_deref() {
                Some("NOT_FOUND") => Error::NotFound(message),
                Some("FORBIDDEN" | "INSUFFICIENT_SCOPES") => Error::Auth(message),
                _ => Error::Api(message),
            });
        }

        self.data
            .ok_or_else(|| Error::Transport("GraphQL response carried no data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct PullRequestData {
    pub repository: Option<RepositoryData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryData {
    pub pull_request: Option<GraphQLPullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLPullRequest {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: PrState,
    pub base_repository: Option<GraphQLRepository>,
    pub head_ref: Option<GraphQLRef>,
    pub head_repository: Option<GraphQLRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRepository {
    pub id: String,
    pub name_with_owner: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchResults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub nodes: Vec<Option<GraphQLSearchNode>>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// A search hit. Issue hits only carry `__typename` because the selection
/// set is limited to `PullRequest`.
#[derive(Debug, Deserialize)]
pub struct GraphQLSearchNode {
    #[serde(rename = "__typename")]
    pub typename: String,
    pub number: Option<u64>,
    pub title: Option<String>,
    pub state: Option<PrState>,
    pub url: Option<String>,
}

impl From<GraphQLRepository> for RepoRef {
    fn from(repo: GraphQLRepository) -> Self {
        RepoRef {
            id: repo.id,
            full_name: repo.name_with_owner,
        }
    }
}

impl From<GraphQLRef> for BranchRef {
    fn from(branch: GraphQLRef) -> Self {
        BranchRef {
            id: branch.id,
            name: branch.name,
        }
    }
}

/// Extracts the pull request from a lookup payload, treating a missing
/// repository or PR as not found.
pub fn convert_pull_request_data(
    data: PullRequestData,
    repo: &Repo,
    number: u64,
) -> Result<PullRequest, Error> {
    let graphql_pr = data
        .repository
        .ok_or_else(|| Error::NotFound(format!("repository {repo}")))?
        .pull_request
        .ok_or_else(|| Error::NotFound(format!("PR {number} in {repo}")))?;

    convert_graphql_pr(graphql_pr)
}

pub fn convert_graphql_pr(graphql_pr: GraphQLPullRequest) -> Result<PullRequest, Error> {
    let base_repository = graphql_pr
        .base_repository
        .ok_or_else(|| Error::Api(format!("PR {} has no base repository", graphql_pr.number)))?;

    Ok(PullRequest {
        id: graphql_pr.id,
        number: graphql_pr.number,
        title: graphql_pr.title,
        url: graphql_pr.url,
        state: graphql_pr.state,
        base_repository: base_repository.into(),
        head_ref: graphql_pr.head_ref.map(Into::into),
        head_repository: graphql_pr.head_repository.map(Into::into),
    })
}

/// Converts one search page, dropping null entries and hits that are not
/// pull requests.
pub fn convert_search_results(results: SearchResults) -> SearchPage {
    let summaries = results
        .nodes
        .into_iter()
        .flatten()
        .filter(|node| node.typename == "PullRequest")
        .filter_map(|node| {
            Some(PullRequestSummary {
                number: node.number?,
                title: node.title?,
                state: node.state?,
                url: node.url?,
            })
        })
        .collect();

    SearchPage {
        results: summaries,
        end_cursor: results.page_info.end_cursor,
        has_next_page: results.page_info.has_next_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_sets_page_size_and_null_cursor() {
        let query = create_search_query("repo:acme/widgets is:open", None);
        assert_eq!(query["variables"]["first"], 100);
        assert_eq!(query["variables"]["query"], "repo:acme/widgets is:open");
        assert!(query["variables"]["after"].is_null());

        let query = create_search_query("x", Some("Y3Vyc29yOjEwMA=="));
        assert_eq!(query["variables"]["after"], "Y3Vyc29yOjEwMA==");
    }

    #[test]
    fn pull_request_lookup_decodes() {
        let body = serde_json::json!({
            "data": {
                "repository": {
                    "pullRequest": {
                        "id": "PR_kwDOA",
                        "number": 42,
                        "title": "Add sprockets",
                        "url": "https://github.com/acme/widgets/pull/42",
                        "state": "OPEN",
                        "baseRepository": { "id": "R1", "nameWithOwner": "acme/widgets" },
                        "headRef": { "id": "REF_1", "name": "feature/sprockets" },
                        "headRepository": { "id": "R1", "nameWithOwner": "acme/widgets" }
                    }
                }
            }
        });
        let response: GraphQLResponse<PullRequestData> = serde_json::from_value(body).unwrap();
        let repo = Repo::new("acme", "widgets").unwrap();
        let pr = convert_pull_request_data(response.into_data().unwrap(), &repo, 42).unwrap();

        assert_eq!(pr.id, "PR_kwDOA");
        assert_eq!(pr.state, PrState::Open);
        assert_eq!(pr.head_ref.as_ref().unwrap().name, "feature/sprockets");
        assert!(pr.is_same_repository());
    }

    #[test]
    fn missing_pull_request_is_not_found() {
        let body = serde_json::json!({
            "data": { "repository": { "pullRequest": null } },
            "errors": [{
                "type": "NOT_FOUND",
                "path": ["repository", "pullRequest"],
                "message": "Could not resolve to a PullRequest with the number of 9999."
            }]
        });
        let response: GraphQLResponse<PullRequestData> = serde_json::from_value(body).unwrap();
        let err = response.into_data().unwrap_err();
        assert!(matches!(err, Error::NotFound(msg) if msg.contains("9999")));

        let repo = Repo::new("acme", "widgets").unwrap();
        let data = PullRequestData {
            repository: Some(RepositoryData { pull_request: None }),
        };
        let err = convert_pull_request_data(data, &repo, 9999).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn graphql_error_types_are_classified() {
        let response: GraphQLResponse<serde_json::Value> = serde_json::from_value(
            serde_json::json!({ "errors": [{ "type": "FORBIDDEN", "message": "nope" }] }),
        )
        .unwrap();
        assert!(matches!(response.into_data(), Err(Error::Auth(_))));

        let response: GraphQLResponse<serde_json::Value> = serde_json::from_value(
            serde_json::json!({ "errors": [{ "message": "Something went wrong" }] }),
        )
        .unwrap();
        assert!(matches!(response.into_data(), Err(Error::Api(_))));

        let response: GraphQLResponse<serde_json::Value> =
            serde_json::from_value(serde_json::json!({ "data": null })).unwrap();
        assert!(matches!(response.into_data(), Err(Error::Transport(_))));
    }

    #[test]
    fn search_page_drops_issue_hits() {
        let body = serde_json::json!({
            "data": {
                "search": {
                    "nodes": [
                        { "__typename": "PullRequest", "number": 1, "title": "a", "state": "MERGED", "url": "https://github.com/acme/widgets/pull/1" },
                        { "__typename": "Issue" },
                        null,
                        { "__typename": "PullRequest", "number": 3, "title": "c", "state": "OPEN", "url": "https://github.com/acme/widgets/pull/3" }
                    ],
                    "pageInfo": { "hasNextPage": true, "endCursor": "Y3Vyc29yOjM=" }
                }
            }
        });
        let response: GraphQLResponse<SearchData> = serde_json::from_value(body).unwrap();
        let page = convert_search_results(response.into_data().unwrap().search);

        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].number, 1);
        assert_eq!(page.results[0].state, PrState::Merged);
        assert_eq!(page.results[1].number, 3);
        assert!(page.has_next_page);
        assert_eq!(page.end_cursor.as_deref(), Some("Y3Vyc29yOjM="));
    }
}
