#[derive(Debug, thiserror::Error)]
pub enum MemopError {
    #[error("{0}")]
    Usage(String),
    #[error("cannot read process table: {0}")]
    ProcessTable(#[source] std::io::Error),
    #[error("Windows API error: {0}")]
    WinApi(String),
    #[error("input error: {0}")]
    Input(#[source] std::io::Error),
    #[error("output error: {0}")]
    Output(#[source] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
}
