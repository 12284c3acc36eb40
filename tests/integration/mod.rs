mod readings;
mod reconfigure;
