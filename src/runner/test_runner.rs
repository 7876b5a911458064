use crate::parser::HttpFile;
use crate::runner::executor::Executor;
use crate::runner::types::{TestResult, TestSummary};
use std::time::Instant;
use tracing::debug;

/// 执行文件中的所有请求并逐个判定结果
///
/// 捕获的值会像顺序执行一样传递给后续请求，但不会中断执行：
/// 无法构建的请求记为失败。
pub struct TestRunner {
    executor: Executor,
}

impl TestRunner {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    pub async fn run(&self, file: &mut HttpFile) -> TestSummary {
        let results = self.run_with(file, |_| {}).await;
        TestSummary::from_results(&results)
    }

    /// 同 [`run`](Self::run)，每得到一个结果就交给 `on_result`
    pub async fn run_with(
        &self,
        file: &mut HttpFile,
        mut on_result: impl FnMut(&TestResult),
    ) -> Vec<TestResult> {
        let HttpFile {
            requests,
            variables,
            ..
        } = file;
        let mut results = Vec::with_capacity(requests.len());

        for (i, request) in requests.iter().enumerate() {
            let request_number = i + 1;
            let resolved = request.resolve(variables);
            let start = Instant::now();

            let result = match self.executor.execute(&resolved).await {
                Ok(response) => {
                    variables.extend(&response.captured_variables);
                    TestResult::from_response(request_number, &resolved, response)
                }
                Err(e) => {
                    debug!(request_number, error = %e, "request could not be built");
                    TestResult::error(request_number, &resolved, e.to_string(), start.elapsed())
                }
            };

            on_result(&result);
            results.push(result);
        }

        results
    }
}
