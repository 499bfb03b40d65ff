// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use tikv_jemallocator::Jemalloc;
use verisight_core::factory;
use verisight_core::infra::cli;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::troubleshooting::setup_troubleshooting();
    let invocation = cli::parsing::parse_arguments()?;

    let verisight = factory::create_verisight(&invocation.settings, invocation.client, invocation.use_colors)?;
    verisight.execute(invocation.task).await?;

    Ok(())
}
