mod provider;

mod relay;
