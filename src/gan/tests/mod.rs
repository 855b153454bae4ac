mod objective;
