use crate::error::{SequenceAborted, TransportError};
use crate::http::{Client, Response, Status};
use crate::parser::{Headers, HttpFile, Request};
use crate::variable::{Variables, capture_variables};
use crate::{HrunError, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 通过 HTTP 执行已替换变量的请求
#[derive(Clone)]
pub struct Executor {
    client: Client,
}

impl Executor {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::new(timeout)?,
        })
    }

    /// 执行单个已替换变量的请求
    ///
    /// 只有请求无法构建时才返回 `Err`。交给传输层之后的失败
    /// 以设置了 `error` 的 `Response` 返回。
    pub async fn execute(&self, request: &Request) -> Result<Response> {
        let start = Instant::now();
        let http_request = self.client.build(request)?;

        info!(method = %request.method, url = %request.url, "sending request");

        let http_response = match self.client.execute(http_request).await {
            Ok(r) => r,
            Err(e) => {
                let duration = start.elapsed();
                let error = TransportError::from(e);
                warn!(url = %request.url, %error, "request failed");
                return Ok(Response::failed(error, duration));
            }
        };

        let status = Status::from(http_response.status());
        let headers = Headers::from(http_response.headers());

        let body = match http_response.text().await {
            Ok(body) => body,
            Err(e) => {
                let mut response = Response::failed(TransportError::from(e), start.elapsed());
                response.status = Some(status);
                response.headers = headers;
                return Ok(response);
            }
        };

        let mut response = Response::new(status, headers, body, start.elapsed());
        info!(
            status = status.code(),
            duration_ms = response.duration.as_millis() as u64,
            "received response"
        );

        if !request.captures.is_empty() {
            response.captured_variables = capture_variables(&response.body, &request.captures);
            debug!(
                requested = request.captures.len(),
                captured = response.captured_variables.len(),
                "applied capture rules"
            );
        }

        Ok(response)
    }

    /// 按顺序执行请求，捕获的值传递给后续请求
    ///
    /// 每个捕获的值都会写入 `variables`。
    /// 遇到第一个无法构建的请求时停止。
    pub async fn execute_sequence(
        &self,
        requests: &[Request],
        variables: &mut Variables,
    ) -> std::result::Result<Vec<Response>, SequenceAborted> {
        let mut responses = Vec::with_capacity(requests.len());

        for (i, request) in requests.iter().enumerate() {
            let resolved = request.resolve(variables);
            debug!(index = i + 1, label = %resolved.label(), "executing sequence step");

            let response = match self.execute(&resolved).await {
                Ok(response) => response,
                Err(source) => {
                    return Err(SequenceAborted {
                        index: i + 1,
                        responses,
                        source,
                    });
                }
            };

            variables.extend(&response.captured_variables);
            responses.push(response);
        }

        Ok(responses)
    }

    /// 使用文件自身的变量执行所有请求
    pub async fn execute_all(
        &self,
        file: &mut HttpFile,
    ) -> std::result::Result<Vec<Response>, SequenceAborted> {
        let HttpFile {
            requests,
            variables,
            ..
        } = file;
        self.execute_sequence(requests, variables).await
    }

    /// 替换变量并执行第 `index` 个请求（从 1 开始）
    pub async fn execute_index(&self, file: &HttpFile, index: usize) -> Result<Response> {
        let request = file
            .get_by_index(index)
            .ok_or(HrunError::RequestIndexOutOfRange {
                index,
                count: file.requests.len(),
            })?;
        self.execute(&request.resolve(&file.variables)).await
    }

    /// 替换变量并执行第一个名为 `name` 的请求
    pub async fn execute_named(&self, file: &HttpFile, name: &str) -> Result<Response> {
        let request = file
            .find_by_name(name)
            .ok_or_else(|| HrunError::RequestNotFound(name.to_string()))?;
        self.execute(&request.resolve(&file.variables)).await
    }
}
