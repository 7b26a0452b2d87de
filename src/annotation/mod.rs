pub mod ss_dis;
