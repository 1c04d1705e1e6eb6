mod configured;
mod pipeline;
