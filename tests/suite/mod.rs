mod config_loading;
mod engine_runtime;
mod guidance_scenarios;
